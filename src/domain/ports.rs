use crate::utils::error::Result;

/// Byte-level backing store for the JSON rule files.
pub trait Storage {
    fn exists(&self, path: &str) -> bool;
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        (**self).write_file(path, data)
    }
}
