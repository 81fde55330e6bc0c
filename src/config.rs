use std::path::PathBuf;

/// 程序配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// 监听地址
    pub bind_address: String,
    /// SQLite 数据库文件；为空时使用内存网关
    pub database_path: Option<PathBuf>,
    /// 启动时导入的 TOML 种子文件
    pub seed_file: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            database_path: None,
            seed_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源构建配置，无法解析的值回退为默认值
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            bind_address: lookup("TRIVIA_BIND_ADDRESS").unwrap_or(default.bind_address),
            database_path: lookup("TRIVIA_DATABASE_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or(default.database_path),
            seed_file: lookup("TRIVIA_SEED_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or(default.seed_file),
            verbose_logging: lookup("TRIVIA_VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        }
    }
}
