use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use serde::Serialize;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
        }
    }

    fn parse(level: &str) -> Option<Level> {
        match level {
            "success" => Some(Level::Success),
            "warning" => Some(Level::Warning),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Notice {
    CategoryCreated,
    CategoryUpdated,
    CategoryDeleted,
    CategoryUndeleted,
}

impl Notice {
    const ALL: [Notice; 4] = [
        Notice::CategoryCreated,
        Notice::CategoryUpdated,
        Notice::CategoryDeleted,
        Notice::CategoryUndeleted,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Notice::CategoryCreated => "category.created",
            Notice::CategoryUpdated => "category.updated",
            Notice::CategoryDeleted => "category.deleted",
            Notice::CategoryUndeleted => "category.undeleted",
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Notice::CategoryCreated | Notice::CategoryUpdated => Level::Success,
            Notice::CategoryDeleted | Notice::CategoryUndeleted => Level::Warning,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::CategoryCreated => "The category has been created.",
            Notice::CategoryUpdated => "The category has been updated.",
            Notice::CategoryDeleted => "The category has been deleted.",
            Notice::CategoryUndeleted => {
                "The category could not be deleted because it still has transactions."
            }
        }
    }

    fn from_key(key: &str) -> Option<Notice> {
        Notice::ALL.into_iter().find(|n| n.key() == key)
    }

    /// Cookie carrying this notice to the next page.
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, format!("{}:{}", self.level().as_str(), self.key()))
            .path("/")
            .http_only(true)
            .finish()
    }
}

#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct FlashMessage {
    pub level: Level,
    pub message: &'static str,
}

/// Reads the pending notice of the request, if any. Cookies with an unknown level or key are
/// ignored.
pub fn read(req: &HttpRequest) -> Option<FlashMessage> {
    let cookie = req.cookie(FLASH_COOKIE)?;
    parse(cookie.value())
}

fn parse(value: &str) -> Option<FlashMessage> {
    let (level, key) = value.split_once(':')?;
    let level = Level::parse(level)?;
    let notice = Notice::from_key(key)?;
    Some(FlashMessage {
        level,
        message: notice.message(),
    })
}

/// Expires the flash cookie once it has been shown.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
