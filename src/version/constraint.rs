//! PHP version constraint parsing and matching
//!
//! Supports the subset of Composer's constraint syntax found in `require.php`:
//! - `8.2.0`, `=8.2.0` - exact match
//! - `^8.1` - caret: same major, >=8.1.0
//! - `~8.1.0` - tilde: same major and minor, >=8.1.0
//! - `>=7.4`, `>7.4`, `<=8.0`, `<8.0` - comparison operators
//! - `>=7.4 <8.0`, `>=7.4, <8.0` - all atoms in a group must match (AND)
//! - `^7.4|^8.0`, `^7.4 || ^8.0` - any group may match (OR)

use std::fmt;
use std::str::FromStr;

use crate::version::error::ConstraintError;
use crate::version::semver::SemVersion;

/// Comparison operator of a single constraint atom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// No operator: exact match
    Bare,
    Exact,
    Caret,
    Tilde,
    Gte,
    Gt,
    Lte,
    Lt,
}

impl Op {
    /// Operator tokens, two-character ones first so `>=` wins over `>`
    const TOKENS: [(&'static str, Op); 7] = [
        (">=", Op::Gte),
        ("<=", Op::Lte),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("=", Op::Exact),
        ("^", Op::Caret),
        ("~", Op::Tilde),
    ];

    /// Split a leading operator off `token`
    fn split_prefix(token: &str) -> (Op, &str) {
        Self::TOKENS
            .iter()
            .find_map(|(prefix, op)| token.strip_prefix(*prefix).map(|rest| (*op, rest)))
            .unwrap_or((Op::Bare, token))
    }

    fn as_str(&self) -> &'static str {
        match self {
            Op::Bare => "",
            Op::Exact => "=",
            Op::Caret => "^",
            Op::Tilde => "~",
            Op::Gte => ">=",
            Op::Gt => ">",
            Op::Lte => "<=",
            Op::Lt => "<",
        }
    }
}

/// A single operator + version requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    pub op: Op,
    pub version: SemVersion,
}

impl Atom {
    pub const fn new(op: Op, version: SemVersion) -> Self {
        Self { op, version }
    }

    /// Check if a candidate version satisfies this atom
    pub fn matches(&self, candidate: &SemVersion) -> bool {
        let v = &self.version;
        match self.op {
            Op::Bare | Op::Exact => candidate == v,
            Op::Gte => candidate >= v,
            Op::Gt => candidate > v,
            Op::Lte => candidate <= v,
            Op::Lt => candidate < v,
            // ^8.1.0 -> >=8.1.0 <9.0.0
            Op::Caret => candidate >= v && candidate.major == v.major,
            // ~8.1.0 -> >=8.1.0 <8.2.0
            Op::Tilde => candidate >= v && candidate.major == v.major && candidate.minor == v.minor,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// Atoms that must all match (AND)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementGroup {
    atoms: Vec<Atom>,
}

impl RequirementGroup {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn matches(&self, candidate: &SemVersion) -> bool {
        self.atoms.iter().all(|atom| atom.matches(candidate))
    }

    fn parse(expr: &str, group: &str) -> Result<Self, ConstraintError> {
        let mut atoms = Vec::new();
        let mut pending: Option<Op> = None;

        for token in group
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let (op, rest) = match pending.take() {
                // `>= 7.4`: the version of a dangling operator is the next token
                Some(op) => (op, token),
                None => Op::split_prefix(token),
            };

            if rest.is_empty() {
                if op == Op::Bare {
                    return Err(ConstraintError::malformed(expr, "empty atom"));
                }
                pending = Some(op);
                continue;
            }

            let version = SemVersion::parse(rest)
                .map_err(|_| ConstraintError::malformed(expr, format!("invalid atom '{token}'")))?;
            atoms.push(Atom::new(op, version));
        }

        if let Some(op) = pending {
            return Err(ConstraintError::malformed(
                expr,
                format!("operator '{}' has no version", op.as_str()),
            ));
        }

        if atoms.is_empty() {
            return Err(ConstraintError::malformed(expr, "empty requirement group"));
        }

        Ok(Self { atoms })
    }
}

impl fmt::Display for RequirementGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{atom}")?;
        }
        Ok(())
    }
}

/// Alternative requirement groups (OR); never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    groups: Vec<RequirementGroup>,
}

impl VersionConstraint {
    /// Parse a constraint expression such as `^7.4|^8.0` or `>=7.4 <8.0`
    pub fn parse(expr: &str) -> Result<Self, ConstraintError> {
        if expr.trim().is_empty() {
            return Err(ConstraintError::malformed(expr, "empty constraint"));
        }

        let groups = expr
            .replace("||", "|")
            .split('|')
            .map(|group| RequirementGroup::parse(expr, group.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[RequirementGroup] {
        &self.groups
    }

    /// True if at least one group is fully satisfied by `candidate`
    pub fn matches(&self, candidate: &SemVersion) -> bool {
        self.groups.iter().any(|group| group.matches(candidate))
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{group}")?;
        }
        Ok(())
    }
}
