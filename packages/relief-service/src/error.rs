pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	Validation { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error("{message}")]
	Auth { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	/// Stable tag for a boundary layer to switch on.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Validation { .. } => "validation",
			Self::NotFound { .. } => "not_found",
			Self::Auth { .. } => "auth",
			Self::Storage { .. } => "storage",
			Self::Internal { .. } => "internal",
		}
	}

	pub(crate) fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}

	pub(crate) fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound { message: message.into() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<relief_storage::Error> for Error {
	fn from(err: relief_storage::Error) -> Self {
		match err {
			relief_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			relief_storage::Error::InvalidArgument(message) => Self::Validation { message },
			relief_storage::Error::UnexpectedShape(message) => Self::Internal { message },
			other @ (relief_storage::Error::UnknownColumn { .. }
			| relief_storage::Error::TypeMismatch { .. }) =>
				Self::Storage { message: other.to_string() },
		}
	}
}
