//! Compile-time macro registry
//!
//! Macros are a closed set: a call is only expanded when its callee was
//! imported by name from [`MACRO_MODULE`] and macro mode is enabled.

use std::fmt;
use std::str::FromStr;

/// Module specifier that macros must be imported from
pub const MACRO_MODULE: &str = "@conf-ts/macro";

/// Known macros
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    /// `env(name, fallback?)`: read an environment variable
    Env,
    /// `arrayMap(sequence, transform)`: map an arrow function over a sequence
    ArrayMap,
}

impl MacroKind {
    /// All macros, in documentation order
    pub const ALL: [MacroKind; 2] = [MacroKind::Env, MacroKind::ArrayMap];

    /// Look up a macro by its exported name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "env" => Some(MacroKind::Env),
            "arrayMap" => Some(MacroKind::ArrayMap),
            _ => None,
        }
    }

    /// Exported name of the macro
    pub const fn name(self) -> &'static str {
        match self {
            MacroKind::Env => "env",
            MacroKind::ArrayMap => "arrayMap",
        }
    }

    /// Accepted argument count range (inclusive)
    pub const fn arity(self) -> (usize, usize) {
        match self {
            MacroKind::Env => (1, 2),
            MacroKind::ArrayMap => (2, 2),
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MacroKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown macro '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_names_round_trip() {
        for kind in MacroKind::ALL {
            assert_eq!(MacroKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(MacroKind::from_name("map"), None);
        assert!("arrayMap".parse::<MacroKind>().is_ok());
    }
}
