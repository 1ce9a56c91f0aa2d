use clinic_core::SqlParam;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// Bind every parameter positionally, keeping its SQL type even when null.
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_deref()),
            SqlParam::Uuid(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
            SqlParam::Timestamp(v) => query.bind(*v),
            SqlParam::Json(v) => query.bind(v.clone()),
        };
    }
    query
}
