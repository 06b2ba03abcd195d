//! Централизованная конфигурация для Whatsfly Core
//!
//! Процессные настройки (где искать движок, сколько клиентов можно держать)
//! живут в [`Config`]; параметры отдельного клиента в [`ClientConfiguration`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Жёсткий предел: количество trampoline-слотов, скомпилированных в мост
pub const MAX_BRIDGE_SLOTS: usize = 32;

/// Глобальная конфигурация приложения (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // НАТИВНЫЙ ДВИЖОК
    // ============================================

    /// Явный путь к библиотеке движка (имеет приоритет над `engine_dir`)
    pub engine_path: Option<PathBuf>,

    /// Каталог, в котором ищется `whatsmeow-<os>-<arch>.dylib`
    pub engine_dir: PathBuf,

    /// Код возврата, который движок использует для успешной отправки
    pub send_success_code: i32,

    // ============================================
    // КЛИЕНТЫ
    // ============================================

    /// Максимальное количество одновременно живых клиентов (не больше `MAX_BRIDGE_SLOTS`)
    pub max_clients: usize,

    /// Метаданные устройства по умолчанию
    pub default_machine: String,
    pub default_browser: String,

    // ============================================
    // МЕДИА
    // ============================================

    /// Подкаталоги, создаваемые в корне медиа
    pub media_subdirectories: [&'static str; 5],
}

impl Config {
    /// Создать конфигурацию с дефолтными значениями
    pub fn default() -> Self {
        Self {
            engine_path: None,
            engine_dir: PathBuf::from("whatsmeow"),
            send_success_code: crate::native::SEND_SUCCESS,

            max_clients: MAX_BRIDGE_SLOTS,
            default_machine: "mac".to_string(),
            default_browser: "safari".to_string(),

            media_subdirectories: ["images", "audios", "videos", "documents", "stickers"],
        }
    }

    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WHATSFLY_ENGINE_PATH") {
            if !val.is_empty() {
                config.engine_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("WHATSFLY_ENGINE_DIR") {
            if !val.is_empty() {
                config.engine_dir = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("WHATSFLY_MAX_CLIENTS") {
            if let Ok(parsed) = val.parse::<usize>() {
                config.max_clients = parsed.min(MAX_BRIDGE_SLOTS);
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию из окружения при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::from_env)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG.set(config)
            .map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }

    /// Путь к библиотеке движка для `load_default_engine`
    pub fn resolved_engine_path(&self) -> PathBuf {
        match &self.engine_path {
            Some(path) => path.clone(),
            None => self.engine_dir.join(crate::native::library::default_library_name()),
        }
    }
}

/// Параметры одного клиента, фиксируются при создании
///
/// Сериализуется, чтобы хост мог сохранить параметры сессии и пересоздать
/// клиента; отсутствующие поля берутся из [`Config::global`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfiguration {
    /// Пустая строка означает "привязать новое устройство"
    pub phone_number: String,
    /// `None` означает, что медиа не сохраняются
    pub media_path: Option<PathBuf>,
    pub machine: String,
    pub browser: String,
}

impl ClientConfiguration {
    pub fn new() -> Self {
        let cfg = Config::global();
        Self {
            phone_number: String::new(),
            media_path: None,
            machine: cfg.default_machine.clone(),
            browser: cfg.default_browser.clone(),
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = phone_number.into();
        self
    }

    /// Пустой путь трактуется как отсутствие медиа-каталога
    pub fn with_media_path(mut self, media_path: impl AsRef<Path>) -> Self {
        let path = media_path.as_ref();
        self.media_path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
        self
    }

    pub fn with_device(mut self, machine: impl Into<String>, browser: impl Into<String>) -> Self {
        self.machine = machine.into();
        self.browser = browser.into();
        self
    }
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
