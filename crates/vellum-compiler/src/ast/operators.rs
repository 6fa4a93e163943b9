//! Operator enums with their ESTree spellings and binding strength.
//!
//! ## Precedence Table (lowest to highest)
//!
//! | Precedence | Operators |
//! |------------|-----------|
//! | 4 | `??` |
//! | 5 | `\|\|` |
//! | 6 | `&&` |
//! | 7 | `\|` |
//! | 8 | `^` |
//! | 9 | `&` |
//! | 10 | `==` `!=` `===` `!==` |
//! | 11 | `<` `>` `<=` `>=` `in` `instanceof` |
//! | 12 | `<<` `>>` `>>>` |
//! | 13 | `+` `-` |
//! | 14 | `*` `/` `%` |
//! | 15 | `**` |
//!
//! Sequence, assignment, conditional, unary and member levels live in the
//! printer, which is the only consumer of these numbers.

use serde::Deserialize;

macro_rules! operator_enum {
    (
        $(#[$doc:meta])*
        $name:ident {
            $($(#[$vdoc:meta])* $variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
        pub enum $name {
            $(
                $(#[$vdoc])*
                #[serde(rename = $text)]
                $variant,
            )*
        }

        impl $name {
            /// The operator as written in source.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum! {
    /// Binary operators.
    BinaryOperator {
        /// `==`
        Equal => "==",
        /// `!=`
        NotEqual => "!=",
        /// `===`
        StrictEqual => "===",
        /// `!==`
        StrictNotEqual => "!==",
        /// `<`
        LessThan => "<",
        /// `<=`
        LessThanEqual => "<=",
        /// `>`
        GreaterThan => ">",
        /// `>=`
        GreaterThanEqual => ">=",
        /// `<<`
        LeftShift => "<<",
        /// `>>`
        RightShift => ">>",
        /// `>>>`
        UnsignedRightShift => ">>>",
        /// `+`
        Add => "+",
        /// `-`
        Subtract => "-",
        /// `*`
        Multiply => "*",
        /// `/`
        Divide => "/",
        /// `%`
        Modulo => "%",
        /// `**`
        Exponent => "**",
        /// `|`
        BitwiseOr => "|",
        /// `^`
        BitwiseXor => "^",
        /// `&`
        BitwiseAnd => "&",
        /// `in`
        In => "in",
        /// `instanceof`
        InstanceOf => "instanceof",
    }
}

operator_enum! {
    /// Short-circuiting operators.
    LogicalOperator {
        /// `||`
        Or => "||",
        /// `&&`
        And => "&&",
        /// `??`
        NullishCoalescing => "??",
    }
}

operator_enum! {
    /// Unary operators.
    UnaryOperator {
        /// `-`
        Minus => "-",
        /// `+`
        Plus => "+",
        /// `!`
        LogicalNot => "!",
        /// `~`
        BitwiseNot => "~",
        /// `typeof`
        Typeof => "typeof",
        /// `void`
        Void => "void",
        /// `delete`
        Delete => "delete",
    }
}

operator_enum! {
    /// Assignment operators.
    AssignmentOperator {
        /// `=`
        Assign => "=",
        /// `+=`
        AddAssign => "+=",
        /// `-=`
        SubtractAssign => "-=",
        /// `*=`
        MultiplyAssign => "*=",
        /// `/=`
        DivideAssign => "/=",
        /// `%=`
        ModuloAssign => "%=",
        /// `**=`
        ExponentAssign => "**=",
        /// `<<=`
        LeftShiftAssign => "<<=",
        /// `>>=`
        RightShiftAssign => ">>=",
        /// `>>>=`
        UnsignedRightShiftAssign => ">>>=",
        /// `|=`
        BitwiseOrAssign => "|=",
        /// `^=`
        BitwiseXorAssign => "^=",
        /// `&=`
        BitwiseAndAssign => "&=",
        /// `||=`
        LogicalOrAssign => "||=",
        /// `&&=`
        LogicalAndAssign => "&&=",
        /// `??=`
        NullishCoalescingAssign => "??=",
    }
}

impl BinaryOperator {
    /// Binding strength, see the module table.
    pub fn precedence(self) -> u8 {
        use BinaryOperator::*;
        match self {
            BitwiseOr => 7,
            BitwiseXor => 8,
            BitwiseAnd => 9,
            Equal | NotEqual | StrictEqual | StrictNotEqual => 10,
            LessThan | LessThanEqual | GreaterThan | GreaterThanEqual | In | InstanceOf => 11,
            LeftShift | RightShift | UnsignedRightShift => 12,
            Add | Subtract => 13,
            Multiply | Divide | Modulo => 14,
            Exponent => 15,
        }
    }

    /// `**` is the only right-associative binary operator.
    pub fn is_right_associative(self) -> bool {
        self == BinaryOperator::Exponent
    }
}

impl LogicalOperator {
    /// Binding strength, see the module table.
    pub fn precedence(self) -> u8 {
        match self {
            LogicalOperator::NullishCoalescing => 4,
            LogicalOperator::Or => 5,
            LogicalOperator::And => 6,
        }
    }
}

impl UnaryOperator {
    /// Keyword operators need a space before their operand.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            UnaryOperator::Typeof | UnaryOperator::Void | UnaryOperator::Delete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_spelling_round_trip() {
        let op: BinaryOperator = serde_json::from_str(r#""instanceof""#).unwrap();
        assert_eq!(op, BinaryOperator::InstanceOf);
        assert_eq!(op.as_str(), "instanceof");

        let op: AssignmentOperator = serde_json::from_str(r#""??=""#).unwrap();
        assert_eq!(op.to_string(), "??=");
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(BinaryOperator::Multiply.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Add.precedence() > BinaryOperator::StrictEqual.precedence());
        assert!(LogicalOperator::And.precedence() > LogicalOperator::Or.precedence());
        assert!(BinaryOperator::BitwiseOr.precedence() > LogicalOperator::And.precedence());
    }

    #[test]
    fn test_keyword_unary() {
        assert!(UnaryOperator::Typeof.is_keyword());
        assert!(!UnaryOperator::LogicalNot.is_keyword());
    }
}
