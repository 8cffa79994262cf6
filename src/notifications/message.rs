//! Pushwoosh message builder.
//!
//! A `PushwooshMessage` is a plain value until it is queued on a
//! `PendingMessage`. Setters take `&mut self` and return `&mut Self` so they
//! can be chained; setters that validate their input return a
//! `PushwooshResult` and leave the message untouched on failure.

use crate::error::{PushwooshError, PushwooshResult};
use jiff::Zoned;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Format Pushwoosh expects for `send_date`
const SEND_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Lower and upper bound of the `send_rate` throttle
const MIN_SEND_RATE: u32 = 100;
const MAX_SEND_RATE: u32 = 1000;

/// An external notification a message can be associated with
pub trait Notification {
    fn id(&self) -> &str;
}

/// Message text, either for all recipients or per language code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Localized(BTreeMap<String, String>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

/// Platform targeted by root-level parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl FromStr for Platform {
    type Err = PushwooshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            _ => Err(PushwooshError::invalid_argument(
                "platform",
                format!("Invalid platform {s}"),
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery moment accepted by [`PushwooshMessage::deliver_at`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryMoment {
    /// Pre-formatted `YYYY-MM-DD HH:MM` (or `now`)
    Formatted(String),
    /// Wall-clock time without a zone
    Civil(DateTime),
    /// Zoned time; its IANA zone name becomes the message timezone
    Zoned(Zoned),
}

impl From<&str> for DeliveryMoment {
    fn from(value: &str) -> Self {
        DeliveryMoment::Formatted(value.to_string())
    }
}

impl From<String> for DeliveryMoment {
    fn from(value: String) -> Self {
        DeliveryMoment::Formatted(value)
    }
}

impl From<DateTime> for DeliveryMoment {
    fn from(value: DateTime) -> Self {
        DeliveryMoment::Civil(value)
    }
}

impl From<Zoned> for DeliveryMoment {
    fn from(value: Zoned) -> Self {
        DeliveryMoment::Zoned(value)
    }
}

impl From<&Zoned> for DeliveryMoment {
    fn from(value: &Zoned) -> Self {
        DeliveryMoment::Zoned(value.clone())
    }
}

/// One push notification as sent to the createMessage endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PushwooshMessage {
    android_root_params: Option<Map<String, Value>>,
    apns_trim_content: Option<u8>,
    campaign: Option<String>,
    content: Content,
    data: Option<Map<String, Value>>,
    identifier: Option<String>,
    ios_badges: Option<String>,
    ios_category_id: Option<u64>,
    ios_critical: Option<bool>,
    ios_root_params: Option<Map<String, Value>>,
    ios_silent: Option<u8>,
    ios_sound: Option<String>,
    ios_subtitle: Option<String>,
    ios_thread_id: Option<String>,
    ios_title: Option<String>,
    ios_ttl: Option<u64>,
    preset: Option<String>,
    recipient_timezone: bool,
    send_date: String,
    send_rate: Option<u32>,
    shorten_url: bool,
    timezone: Option<String>,
    url: Option<String>,
    sent: bool,
}

impl Default for PushwooshMessage {
    fn default() -> Self {
        Self {
            android_root_params: None,
            apns_trim_content: None,
            campaign: None,
            content: Content::default(),
            data: None,
            identifier: None,
            ios_badges: None,
            ios_category_id: None,
            ios_critical: None,
            ios_root_params: None,
            ios_silent: None,
            ios_sound: None,
            ios_subtitle: None,
            ios_thread_id: None,
            ios_title: None,
            ios_ttl: None,
            preset: None,
            recipient_timezone: false,
            send_date: "now".to_string(),
            send_rate: None,
            shorten_url: true,
            timezone: None,
            url: None,
            sent: false,
        }
    }
}

impl PushwooshMessage {
    /// Creates a message with plain-text content, delivered now
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Content::Text(content.into()),
            ..Self::default()
        }
    }

    /// Associates the message with an external notification
    ///
    /// The notification id becomes the transaction id unless a non-empty
    /// one was already set.
    pub fn associate<N: Notification + ?Sized>(&mut self, notification: &N) -> &mut Self {
        if self.identifier.as_deref().is_none_or(str::is_empty) {
            self.identifier = Some(notification.id().to_string());
        }
        self
    }

    pub fn apns_trim_content(&mut self, apns_trim_content: u8) -> PushwooshResult<&mut Self> {
        self.apns_trim_content = Some(binary_flag("apns_trim_content", apns_trim_content)?);
        Ok(self)
    }

    pub fn campaign(&mut self, campaign: impl Into<String>) -> &mut Self {
        self.campaign = Some(campaign.into());
        self
    }

    /// Sets the content, optionally for a single language
    ///
    /// Setting a language turns plain content into a per-language map.
    /// Setting content without a language replaces everything.
    pub fn content(&mut self, content: impl Into<String>, language: Option<&str>) -> &mut Self {
        let content = content.into();
        match language {
            Some(language) => {
                if !matches!(self.content, Content::Localized(_)) {
                    self.content = Content::Localized(BTreeMap::new());
                }
                if let Content::Localized(ref mut localized) = self.content {
                    localized.insert(language.to_string(), content);
                }
            }
            None => self.content = Content::Text(content),
        }
        self
    }

    /// Sets the delivery moment
    ///
    /// A zoned date-time carries its own timezone, which takes precedence
    /// over `timezone`. Zones without an IANA name (fixed offsets) are sent
    /// as the same instant in UTC.
    pub fn deliver_at(
        &mut self,
        when: impl Into<DeliveryMoment>,
        timezone: Option<&str>,
    ) -> &mut Self {
        let timezone = timezone.map(str::to_string);
        let (send_date, timezone) = match when.into() {
            DeliveryMoment::Formatted(when) => (when, timezone),
            DeliveryMoment::Civil(when) => (when.strftime(SEND_DATE_FORMAT).to_string(), timezone),
            DeliveryMoment::Zoned(when) => match when.time_zone().iana_name() {
                Some(zone) => (
                    when.strftime(SEND_DATE_FORMAT).to_string(),
                    Some(zone.to_string()),
                ),
                None => (
                    when.with_time_zone(TimeZone::UTC)
                        .strftime(SEND_DATE_FORMAT)
                        .to_string(),
                    Some("UTC".to_string()),
                ),
            },
        };

        self.send_date = send_date;
        self.timezone = timezone;
        self
    }

    /// Sets the transaction id, replacing any previous one
    pub fn identifier(&mut self, identifier: impl Into<String>) -> &mut Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Badge value, e.g. `"5"`, `"+1"` or `"-1"`
    pub fn ios_badges(&mut self, ios_badges: impl Into<String>) -> &mut Self {
        self.ios_badges = Some(ios_badges.into());
        self
    }

    pub fn ios_category_id(&mut self, ios_category_id: u64) -> &mut Self {
        self.ios_category_id = Some(ios_category_id);
        self
    }

    pub fn ios_critical(&mut self, ios_critical: bool) -> &mut Self {
        self.ios_critical = Some(ios_critical);
        self
    }

    pub fn ios_silent(&mut self, ios_silent: u8) -> PushwooshResult<&mut Self> {
        self.ios_silent = Some(binary_flag("ios_silent", ios_silent)?);
        Ok(self)
    }

    pub fn ios_sound(&mut self, ios_sound: impl Into<String>) -> &mut Self {
        self.ios_sound = Some(ios_sound.into());
        self
    }

    pub fn ios_subtitle(&mut self, ios_subtitle: impl Into<String>) -> &mut Self {
        self.ios_subtitle = Some(ios_subtitle.into());
        self
    }

    pub fn ios_thread_id(&mut self, ios_thread_id: impl Into<String>) -> &mut Self {
        self.ios_thread_id = Some(ios_thread_id.into());
        self
    }

    pub fn ios_title(&mut self, ios_title: impl Into<String>) -> &mut Self {
        self.ios_title = Some(ios_title.into());
        self
    }

    /// Time to live in seconds
    pub fn ios_ttl(&mut self, ios_ttl: u64) -> &mut Self {
        self.ios_ttl = Some(ios_ttl);
        self
    }

    pub fn preset(&mut self, preset: impl Into<String>) -> &mut Self {
        self.preset = Some(preset.into());
        self
    }

    /// Limits the rollout to `limit` messages per second, clamped to 100..=1000
    pub fn throttle(&mut self, limit: u32) -> &mut Self {
        self.send_rate = Some(limit.clamp(MIN_SEND_RATE, MAX_SEND_RATE));
        self
    }

    /// Links the message to `url`, asking Pushwoosh to shorten it
    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url_with(url, true)
    }

    /// Links the message to `url`, shortening only when `shorten` is set
    pub fn url_with(&mut self, url: impl Into<String>, shorten: bool) -> &mut Self {
        self.url = Some(url.into());
        self.shorten_url = shorten;
        self
    }

    /// Deliver according to each recipient's own timezone
    pub fn use_recipient_timezone(&mut self) -> &mut Self {
        self.recipient_timezone = true;
        self
    }

    /// Adds a root level parameter
    ///
    /// Without a platform the value goes to both the Android and iOS root
    /// parameters. Android values are mirrored into `data` because
    /// `android_root_params` is not always delivered.
    pub fn with(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        platform: Option<Platform>,
    ) -> &mut Self {
        let key = key.into();
        let value = value.into();

        if platform.unwrap_or(Platform::Android) == Platform::Android {
            self.android_root_params
                .get_or_insert_with(Map::new)
                .insert(key.clone(), value.clone());
            self.data
                .get_or_insert_with(Map::new)
                .insert(key.clone(), value.clone());
        }

        if platform.unwrap_or(Platform::Ios) == Platform::Ios {
            self.ios_root_params
                .get_or_insert_with(Map::new)
                .insert(key, value);
        }

        self
    }

    /// Whether a batch delivered this message
    pub fn was_sent(&self) -> bool {
        self.sent
    }

    pub(crate) fn mark_sent(&mut self) {
        self.sent = true;
    }

    /// The createMessage notification object for this message
    pub fn to_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn wire(&self) -> WireMessage<'_> {
        WireMessage {
            android_root_params: self.android_root_params.as_ref(),
            apns_trim_content: self.apns_trim_content,
            campaign: self.campaign.as_deref(),
            content: &self.content,
            data: self.data.as_ref(),
            ignore_user_timezone: !self.recipient_timezone,
            ios_badges: self.ios_badges.as_deref(),
            ios_category_id: self.ios_category_id,
            ios_critical: self.ios_critical,
            ios_root_params: self.ios_root_params.as_ref(),
            ios_silent: self.ios_silent,
            ios_sound: self.ios_sound.as_deref(),
            ios_subtitle: self.ios_subtitle.as_deref(),
            ios_thread_id: self.ios_thread_id.as_deref(),
            ios_title: self.ios_title.as_deref(),
            ios_ttl: self.ios_ttl,
            link: self.url.as_deref(),
            minimize_link: self.url.as_ref().map(|_| self.shorten_url),
            preset: self.preset.as_deref(),
            send_date: &self.send_date,
            send_rate: self.send_rate,
            transaction_id: self.identifier.as_deref(),
            timezone: self.timezone.as_deref(),
        }
    }
}

impl Serialize for PushwooshMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.wire().serialize(serializer)
    }
}

fn binary_flag(field: &str, value: u8) -> PushwooshResult<u8> {
    match value {
        0 | 1 => Ok(value),
        _ => Err(PushwooshError::invalid_argument(
            field,
            format!("Invalid value {value}, expected 0 or 1"),
        )),
    }
}

/// Notification object as documented for createMessage; unset fields are omitted
#[derive(Serialize)]
struct WireMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    android_root_params: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apns_trim_content: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    campaign: Option<&'a str>,
    content: &'a Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Map<String, Value>>,
    ignore_user_timezone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_badges: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_category_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_critical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_root_params: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_silent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_sound: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_subtitle: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_thread_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ios_ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimize_link: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<&'a str>,
    send_date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_rate: Option<u32>,
    #[serde(rename = "transactionId", skip_serializing_if = "Option::is_none")]
    transaction_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
}
