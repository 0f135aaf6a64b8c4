#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("column \"{column}\" of relation \"{table}\" does not exist")]
	UnknownColumn { table: &'static str, column: String },
	#[error("column \"{column}\" is of type {expected} but the supplied value is {found}")]
	TypeMismatch { column: &'static str, expected: &'static str, found: String },
	#[error("Unexpected result shape: {0}")]
	UnexpectedShape(String),
}
