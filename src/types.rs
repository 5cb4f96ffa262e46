use std::fmt;

/// Pixel-coordinate axis referenced by a variable terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Case-insensitive match of a variable token
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("x") {
            Some(Axis::X)
        } else if token.eq_ignore_ascii_case("y") {
            Some(Axis::Y)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf value of an expression tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Terminal {
    Scalar(f64),
    Vector([f64; 3]),
    Variable(Axis),
}

/// Node kind used to key mutation frequency tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Scalar,
    Vector,
    Variable,
    Function,
}
