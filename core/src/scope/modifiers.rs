use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Declaration modifiers carried by variables, fields, parameters and methods.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Modifiers: u16 {
        const FINAL = 1;
        const STATIC = 1 << 1;
        const PUBLIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const PROTECTED = 1 << 4;
        const VOLATILE = 1 << 5;
        const TRANSIENT = 1 << 6;
    }
}

impl Modifiers {
    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn visibility(self) -> Visibility {
        if self.contains(Modifiers::PUBLIC) {
            Visibility::Public
        } else if self.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Package
        }
    }

    /// Parse a single modifier keyword.
    pub fn from_keyword(word: &str) -> Option<Modifiers> {
        Some(match word {
            "final" => Modifiers::FINAL,
            "static" => Modifiers::STATIC,
            "public" => Modifiers::PUBLIC,
            "private" => Modifiers::PRIVATE,
            "protected" => Modifiers::PROTECTED,
            "volatile" => Modifiers::VOLATILE,
            "transient" => Modifiers::TRANSIENT,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Package => write!(f, "package-private"),
            Visibility::Private => write!(f, "private"),
        }
    }
}
