//! Internal representation of gs programs.
//!
//! Two node families: expressions and statements. Type annotations are
//! carried as opaque strings (e.g. `Map[Int,List[String]]`); only their
//! base prefix is ever inspected, and only at run time.

mod expression;
mod statement;

pub use self::expression::*;
pub use self::statement::*;

/// A parsed program: the ordered sequence of top-level statements.
pub type Program = Vec<Statement>;
