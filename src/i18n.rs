//! Localized strings emitted by the core.
//!
//! Only the strings the navigation core itself produces live here:
//! compass labels, guidance sentences, error messages, and the
//! destination's display name. Button labels and other page copy
//! belong to the frontend. Korean is the app's default language.

use serde::{Deserialize, Serialize};

use crate::geo::Compass;
use crate::location::LocationError;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
    Zh,
    Ja,
}

impl Language {
    /// Parse a language tag. Unknown tags fall back to Korean.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "en" => Language::En,
            "zh" => Language::Zh,
            "ja" => Language::Ja,
            _ => Language::Ko,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
            Language::Zh => "zh",
            Language::Ja => "ja",
        }
    }
}

// Compass labels and guidance sentences are indexed by the sector's
// position in the compass rose: N, NE, E, SE, S, SW, W, NW.

const DIRECTIONS_KO: [&str; 8] = [
    "북쪽", "북동쪽", "동쪽", "남동쪽", "남쪽", "남서쪽", "서쪽", "북서쪽",
];
const DIRECTIONS_EN: [&str; 8] = [
    "North",
    "Northeast",
    "East",
    "Southeast",
    "South",
    "Southwest",
    "West",
    "Northwest",
];
const DIRECTIONS_ZH: [&str; 8] = [
    "北方", "东北", "东方", "东南", "南方", "西南", "西方", "西北",
];
const DIRECTIONS_JA: [&str; 8] = [
    "北", "北東", "東", "南東", "南", "南西", "西", "北西",
];

const GUIDANCE_KO: [&str; 8] = [
    "정북쪽으로 직진",
    "북동쪽으로 이동",
    "정동쪽으로 이동",
    "남동쪽으로 이동",
    "정남쪽으로 이동",
    "남서쪽으로 이동",
    "정서쪽으로 이동",
    "북서쪽으로 이동",
];
const GUIDANCE_EN: [&str; 8] = [
    "Go straight north",
    "Head northeast",
    "Head east",
    "Head southeast",
    "Head south",
    "Head southwest",
    "Head west",
    "Head northwest",
];
const GUIDANCE_ZH: [&str; 8] = [
    "正北方向直行",
    "朝东北方向",
    "朝正东方向",
    "朝东南方向",
    "朝正南方向",
    "朝西南方向",
    "朝正西方向",
    "朝西北方向",
];
const GUIDANCE_JA: [&str; 8] = [
    "正北に直進",
    "北東に向かう",
    "正東に向かう",
    "南東に向かう",
    "正南に向かう",
    "南西に向かう",
    "正西に向かう",
    "北西に向かう",
];

/// Short compass label for a sector ("North", "북쪽", ...).
pub fn direction_label(language: Language, compass: Compass) -> &'static str {
    let table = match language {
        Language::Ko => &DIRECTIONS_KO,
        Language::En => &DIRECTIONS_EN,
        Language::Zh => &DIRECTIONS_ZH,
        Language::Ja => &DIRECTIONS_JA,
    };
    table[compass as usize]
}

/// Guidance sentence for a bearing ("Head northeast", ...).
pub fn detailed_direction(language: Language, bearing_deg: f64) -> &'static str {
    let table = match language {
        Language::Ko => &GUIDANCE_KO,
        Language::En => &GUIDANCE_EN,
        Language::Zh => &GUIDANCE_ZH,
        Language::Ja => &GUIDANCE_JA,
    };
    table[Compass::guidance_sector(bearing_deg) as usize]
}

pub fn destination_name(language: Language) -> &'static str {
    match language {
        Language::Ko => "올림픽공원 나홀로나무",
        Language::En => "Olympic Park Lonely Tree",
        Language::Zh => "奥林匹克公园孤独树",
        Language::Ja => "オリンピック公園一本木",
    }
}

pub fn destination_address(language: Language) -> &'static str {
    match language {
        Language::Ko => "서울특별시 송파구 올림픽로 424",
        Language::En => "424 Olympic-ro, Songpa-gu, Seoul, South Korea",
        Language::Zh => "韩国首尔松坡区奥林匹克路424号",
        Language::Ja => "韓国ソウル特別市松坡区オリンピック路424",
    }
}

/// Message for a failed location request.
///
/// `Unsupported` gets its own text; the recoverable failures share the
/// "allow location services" message.
pub fn location_error_message(language: Language, error: LocationError) -> &'static str {
    match (language, error) {
        (Language::Ko, LocationError::Unsupported) => {
            "이 브라우저는 위치 서비스를 지원하지 않습니다."
        }
        (Language::Ko, _) => "위치 정보를 가져올 수 없습니다. 위치 서비스를 허용해 주세요.",
        (Language::En, LocationError::Unsupported) => {
            "This browser does not support geolocation services."
        }
        (Language::En, _) => {
            "Unable to get location information. Please allow location services."
        }
        (Language::Zh, LocationError::Unsupported) => "此浏览器不支持地理位置服务。",
        (Language::Zh, _) => "无法获取位置信息。请允许位置服务。",
        (Language::Ja, LocationError::Unsupported) => {
            "このブラウザは位置情報サービスをサポートしていません。"
        }
        (Language::Ja, _) => "位置情報を取得できません。位置情報サービスを許可してください。",
    }
}

/// Message shown when the user is beyond the guidance range. The
/// distance is rendered to one decimal.
pub fn too_far_message(language: Language, distance_km: f64) -> String {
    let template = match language {
        Language::Ko => {
            "나홀로나무로부터 {distance}km 떨어져 있습니다. 3km 이내에서만 정확한 안내를 제공합니다."
        }
        Language::En => {
            "You are {distance}km away from the Lonely Tree. Accurate guidance is only provided within 3km."
        }
        Language::Zh => "您距离孤独树{distance}公里。仅在3公里内提供准确指引。",
        Language::Ja => "一本木から{distance}km離れています。3km以内でのみ正確な案内を提供します。",
    };
    template.replace("{distance}", &format!("{distance_km:.1}"))
}

pub fn arrived_message(language: Language) -> &'static str {
    match language {
        Language::Ko => "목적지에 도착했습니다! 🌳",
        Language::En => "You have arrived at your destination! 🌳",
        Language::Zh => "您已到达目的地！🌳",
        Language::Ja => "目的地に到着しました！🌳",
    }
}

/// Soft warning shown when the walking route falls back to a straight
/// line because the directions provider failed.
pub fn route_fallback_message(language: Language) -> &'static str {
    match language {
        Language::Ko => "경로를 찾을 수 없습니다.",
        Language::En => "Could not find a route.",
        Language::Zh => "无法找到路线。",
        Language::Ja => "経路が見つかりません。",
    }
}
