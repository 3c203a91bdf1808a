use diesel::BoxableExpression;
use diesel::pg::Pg;
use diesel::sql_types::Bool;

/// A boxed `WHERE` clause over the table `S`
pub type BoxedCondition<S, T = Bool> =
	Box<dyn BoxableExpression<S, Pg, SqlType = T>>;
