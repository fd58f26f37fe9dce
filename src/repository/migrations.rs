pub const COMMANDS: [&str; 1] = [r#"
    CREATE TABLE IF NOT EXISTS events (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      ts TEXT NOT NULL,
      message TEXT NOT NULL
    );"#];
