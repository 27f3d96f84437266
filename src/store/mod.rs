//! SQL access, one module per table. Every function takes the pool and issues
//! parameterized statements, dynamic clauses being assembled with `QueryBuilder`.

pub mod analytics;
pub mod articles;
pub mod categories;
pub mod settings;
