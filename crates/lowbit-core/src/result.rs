pub type Result<T, E = crate::LowbitError> = std::result::Result<T, E>;
