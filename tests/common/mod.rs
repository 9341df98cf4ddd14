#![allow(dead_code)]

pub mod test_server {
    use std::sync::Once;

    /// Ensures the may runtime is configured only once across tests.
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod fixtures {
    use rusqlite::Connection;
    use std::path::{Path, PathBuf};

    /// Creates a small pets database under `dir` and returns its path.
    ///
    /// Row 2 carries an ampersand for escaping tests; row 3 carries a NULL.
    pub fn create_pets_db(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pets (id INTEGER PRIMARY KEY, name TEXT, notes TEXT);
             INSERT INTO pets (id, name, notes) VALUES
                 (1, 'rex', 'good boy'),
                 (2, 'tom', 'cat & mouse'),
                 (3, 'nib', NULL);",
        )
        .unwrap();
        path
    }
}
