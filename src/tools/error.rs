/// Generic FEC simulator Error
#[derive(Debug)]
pub struct FecSimError(pub std::io::Error);

///
pub type Result<T> = std::result::Result<T, FecSimError>;

impl FecSimError {
    /// Return a new Error with a message
    pub fn new<E>(msg: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>> + std::fmt::Debug,
    {
        log::error!("{:?}", msg);
        FecSimError(std::io::Error::new(std::io::ErrorKind::Other, msg))
    }

    /// Return a new Error of a given kind
    pub fn new_kind<E>(kind: std::io::ErrorKind, msg: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>> + std::fmt::Debug,
    {
        log::error!("{:?}", msg);
        FecSimError(std::io::Error::new(kind, msg))
    }

    /// Shortcut for configuration errors rejected at the call boundary
    pub fn invalid_input<E>(msg: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>> + std::fmt::Debug,
    {
        Self::new_kind(std::io::ErrorKind::InvalidInput, msg)
    }

    /// Kind of the underlying io error
    pub fn kind(&self) -> std::io::ErrorKind {
        self.0.kind()
    }
}

impl std::fmt::Display for FecSimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for FecSimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for FecSimError {
    fn from(err: std::io::Error) -> Self {
        log::error!("{:?}", err);
        FecSimError(err)
    }
}
