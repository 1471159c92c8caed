//! Process-wide memo of loaded datasets, keyed by canonical source path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use crate::StoreError;
use crate::loader::{Dataset, load_dataset};

#[derive(Debug, Default)]
pub struct Catalog {
    datasets: Mutex<HashMap<PathBuf, Arc<Dataset>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared catalog for this process.
    pub fn global() -> &'static Catalog {
        static GLOBAL: OnceLock<Catalog> = OnceLock::new();
        GLOBAL.get_or_init(Catalog::new)
    }

    /// Load `path` once; later calls for the same file return the same `Arc`.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>, StoreError> {
        let key = path
            .canonicalize()
            .map_err(|_| StoreError::SourceNotFound(path.to_path_buf()))?;
        let mut datasets = self
            .datasets
            .lock()
            .map_err(|_| StoreError::Other("catalog lock poisoned".into()))?;
        if let Some(dataset) = datasets.get(&key) {
            debug!(path = %key.display(), "catalog hit");
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_dataset(&key)?);
        datasets.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.datasets.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "Data Julgamento,Título,Ramo Direito\n\
                       2022-04-01,Tema A,Direito Civil\n\
                       2023-04-01,Tema B,Direito Penal;Direito Civil\n";

    #[test]
    fn second_load_returns_same_arc() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dados.csv");
        fs::write(&path, CSV).unwrap();

        let catalog = Catalog::new();
        let first = catalog.get_or_load(&path).unwrap();
        // A different spelling of the same file resolves to the same entry.
        let again = catalog
            .get_or_load(&dir.path().join(".").join("dados.csv"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(catalog.len(), 1);
        assert_eq!(first.table.num_rows(), 3);
    }

    #[test]
    fn missing_file_is_not_memoised() {
        let catalog = Catalog::new();
        let result = catalog.get_or_load(Path::new("/nonexistent/dados.xlsx"));
        assert!(matches!(result, Err(StoreError::SourceNotFound(_))));
        assert!(catalog.is_empty());
    }
}
