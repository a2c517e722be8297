//! Known datasets, keyed by `platform.name`.
//!
//! Every entry describes how inputs are shaped for one remote scraper
//! template. Unknown datasets can still be collected through a bare
//! [`DatasetId`](crate::shared::DatasetId).

use crate::config::{DEFAULT_TIMEOUT_MEDIUM, DEFAULT_TIMEOUT_SHORT};
use rust_decimal::Decimal;
use std::time::Duration;

/// What a dataset expects as its primary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Keyword,
    Prompt,
}

/// A dataset template and the way its inputs are built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSpec {
    pub platform: &'static str,
    pub name: &'static str,
    pub dataset_id: &'static str,
    pub input: InputKind,
    /// Input object key holding the primary value.
    pub field: &'static str,
    /// Enables discovery mode (`type=discover_new&discover_by=..`).
    pub discover_by: Option<&'static str>,
    /// Sent as `url` alongside every prompt.
    pub fixed_url: Option<&'static str>,
    pub default_country: Option<&'static str>,
    pub cost_per_record: Decimal,
    /// Poll budget used when the request does not set one.
    pub default_timeout: Duration,
}

impl DatasetSpec {
    pub fn key(&self) -> String {
        format!("{}.{}", self.platform, self.name)
    }
}

/// 0.001 USD per record.
const STANDARD_RECORD_COST: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

const fn url_dataset(platform: &'static str, name: &'static str, dataset_id: &'static str) -> DatasetSpec {
    DatasetSpec {
        platform,
        name,
        dataset_id,
        input: InputKind::Url,
        field: "url",
        discover_by: None,
        fixed_url: None,
        default_country: None,
        cost_per_record: STANDARD_RECORD_COST,
        default_timeout: DEFAULT_TIMEOUT_MEDIUM,
    }
}

// ─── Amazon ──────────────────────────────────────────────────────────────────

pub const AMAZON_PRODUCTS: DatasetSpec = url_dataset("amazon", "products", "gd_l7q7dkf244hwxbl93");

pub const AMAZON_PRODUCTS_SEARCH: DatasetSpec = DatasetSpec {
    name: "products_search",
    input: InputKind::Keyword,
    field: "keyword",
    discover_by: Some("keyword"),
    ..AMAZON_PRODUCTS
};

// ─── LinkedIn ────────────────────────────────────────────────────────────────

pub const LINKEDIN_PROFILES: DatasetSpec = url_dataset("linkedin", "profiles", "gd_l1oojb10z2jye29kh");
pub const LINKEDIN_COMPANIES: DatasetSpec = url_dataset("linkedin", "companies", "gd_lhkq90okie75oj8mo");
pub const LINKEDIN_JOBS: DatasetSpec = url_dataset("linkedin", "jobs", "gd_lj4v2v5oqpp3qb79j");

// ─── YouTube ─────────────────────────────────────────────────────────────────

pub const YOUTUBE_VIDEOS: DatasetSpec = url_dataset("youtube", "videos", "gd_lk56epmy2i5g7lzu0k");
pub const YOUTUBE_CHANNELS: DatasetSpec = url_dataset("youtube", "channels", "gd_lk538t2k2p1k3oos71");
pub const YOUTUBE_COMMENTS: DatasetSpec = url_dataset("youtube", "comments", "gd_lk9q0ew71spt1mxywf");

// ─── TikTok ──────────────────────────────────────────────────────────────────

pub const TIKTOK_PROFILES: DatasetSpec = url_dataset("tiktok", "profiles", "gd_l1villgoiiidt09ci");
pub const TIKTOK_POSTS: DatasetSpec = url_dataset("tiktok", "posts", "gd_lu702nij2f790tmv9h");
pub const TIKTOK_COMMENTS: DatasetSpec = url_dataset("tiktok", "comments", "gd_lkf2st302ap89utw5k");

pub const TIKTOK_POSTS_BY_KEYWORD: DatasetSpec = DatasetSpec {
    name: "posts_by_keyword",
    input: InputKind::Keyword,
    field: "search_keyword",
    discover_by: Some("keyword"),
    ..TIKTOK_POSTS
};

pub const TIKTOK_PROFILES_BY_SEARCH_URL: DatasetSpec = DatasetSpec {
    name: "profiles_by_search_url",
    field: "search_url",
    discover_by: Some("search_url"),
    ..TIKTOK_PROFILES
};

// ─── AI answers ──────────────────────────────────────────────────────────────

pub const PERPLEXITY_SEARCH: DatasetSpec = DatasetSpec {
    platform: "perplexity",
    name: "search",
    dataset_id: "gd_m7dhdot1vw9a7gc1n",
    input: InputKind::Prompt,
    field: "prompt",
    discover_by: None,
    fixed_url: Some("https://www.perplexity.ai"),
    default_country: Some("US"),
    cost_per_record: STANDARD_RECORD_COST,
    default_timeout: DEFAULT_TIMEOUT_SHORT,
};

pub const CHATGPT_PROMPT: DatasetSpec = DatasetSpec {
    platform: "chatgpt",
    name: "prompt",
    dataset_id: "gd_m7aof0k82r803d5bjm",
    fixed_url: Some("https://chatgpt.com/"),
    default_country: None,
    ..PERPLEXITY_SEARCH
};

static ALL: [DatasetSpec; 15] = [
    AMAZON_PRODUCTS,
    AMAZON_PRODUCTS_SEARCH,
    LINKEDIN_PROFILES,
    LINKEDIN_COMPANIES,
    LINKEDIN_JOBS,
    YOUTUBE_VIDEOS,
    YOUTUBE_CHANNELS,
    YOUTUBE_COMMENTS,
    TIKTOK_PROFILES,
    TIKTOK_POSTS,
    TIKTOK_COMMENTS,
    TIKTOK_POSTS_BY_KEYWORD,
    TIKTOK_PROFILES_BY_SEARCH_URL,
    PERPLEXITY_SEARCH,
    CHATGPT_PROMPT,
];

pub fn all() -> &'static [DatasetSpec] {
    &ALL
}

/// Look up an entry by `platform.name`, case-insensitively.
pub fn find(key: &str) -> Option<&'static DatasetSpec> {
    let (platform, name) = key.trim().split_once('.')?;
    ALL.iter().find(|spec| {
        spec.platform.eq_ignore_ascii_case(platform) && spec.name.eq_ignore_ascii_case(name)
    })
}

pub fn for_platform(platform: &str) -> Vec<&'static DatasetSpec> {
    let platform = platform.trim();
    ALL.iter()
        .filter(|spec| spec.platform.eq_ignore_ascii_case(platform))
        .collect()
}
