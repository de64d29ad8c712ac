//! Original marketplace grammars.
//!
//! Four marketplaces address items with a single capture. Yupoo (seller
//! gallery) and Google Sheets (spreadsheet host) need a second detail each
//! and get named extractors below.

use once_cell::sync::Lazy;
use regex::Regex;

use super::grammar::{capture, pattern, PlatformCapture, PlatformGrammar};
use super::ids::PlatformId;
use super::reference::ReferenceExtra;

static YUPOO_SELLER: Lazy<Regex> = Lazy::new(|| pattern(r"([^/.]+)\.x\.yupoo\.com"));
static YUPOO_ALBUM: Lazy<Regex> = Lazy::new(|| pattern(r"/albums/(\d+)"));
static SHEET_ID: Lazy<Regex> = Lazy::new(|| pattern(r"/spreadsheets/d/([a-zA-Z0-9_-]+)"));
static SHEET_TAB: Lazy<Regex> = Lazy::new(|| pattern(r"[#&?]gid=(\d+)"));

/// Marketplaces agents can resell from.
pub const MARKETPLACES: [PlatformId; 4] = [
    PlatformId::TAOBAO,
    PlatformId::TMALL,
    PlatformId::WEIDIAN,
    PlatformId::ALI_1688,
];

/// Platforms recognised for saving and display only; no agent carries them.
pub const PASSTHROUGH: [PlatformId; 2] = [PlatformId::YUPOO, PlatformId::SHEETS];

/// Built-in platform grammars in match order.
pub fn builtin_platforms() -> Vec<PlatformGrammar> {
    vec![
        PlatformGrammar::pattern(
            PlatformId::TAOBAO,
            "taobao.com",
            "Taobao",
            r"[?&]id=(\d+)",
            build_taobao,
        ),
        PlatformGrammar::pattern(
            PlatformId::TMALL,
            "tmall.com",
            "Tmall",
            r"[?&]id=(\d+)",
            build_tmall,
        ),
        PlatformGrammar::pattern(
            PlatformId::WEIDIAN,
            "weidian.com",
            "Weidian",
            r"[?&]itemID=(\d+)",
            build_weidian,
        ),
        PlatformGrammar::pattern(
            PlatformId::ALI_1688,
            "1688.com",
            "1688",
            r"/offer/(\d+)\.html",
            build_1688,
        ),
        PlatformGrammar::custom(
            PlatformId::YUPOO,
            "yupoo.com",
            "Yupoo",
            extract_yupoo,
            build_yupoo,
        ),
        PlatformGrammar::custom(
            PlatformId::SHEETS,
            "docs.google.com",
            "Google Sheets",
            extract_sheet,
            build_sheet,
        ),
    ]
}

fn build_taobao(capture: &PlatformCapture) -> String {
    format!("https://item.taobao.com/item.htm?id={}", capture.item_id)
}

fn build_tmall(capture: &PlatformCapture) -> String {
    format!("https://detail.tmall.com/item.htm?id={}", capture.item_id)
}

fn build_weidian(capture: &PlatformCapture) -> String {
    format!(
        "https://weidian.com/item.html?itemID={}&spider_token=9db1",
        capture.item_id
    )
}

fn build_1688(capture: &PlatformCapture) -> String {
    format!("https://detail.1688.com/offer/{}.html", capture.item_id)
}

/// Seller subdomain plus an optional album id. The item id is the album when
/// present, otherwise the seller itself.
fn extract_yupoo(url: &str) -> Option<PlatformCapture> {
    let seller = capture(&YUPOO_SELLER, url)?.to_ascii_lowercase();
    let extra = ReferenceExtra::seller(seller.clone());

    Some(match capture(&YUPOO_ALBUM, url) {
        Some(album) => PlatformCapture {
            item_id: album.to_string(),
            extra: Some(extra.album(album)),
        },
        None => PlatformCapture {
            item_id: seller,
            extra: Some(extra),
        },
    })
}

fn build_yupoo(capture: &PlatformCapture) -> String {
    let extra = capture.extra.as_ref();
    let seller = extra
        .and_then(|e| e.seller.as_deref())
        .unwrap_or(&capture.item_id);

    match extra.and_then(|e| e.album.as_deref()) {
        Some(album) => format!("https://{seller}.x.yupoo.com/albums/{album}"),
        None => format!("https://{seller}.x.yupoo.com/albums"),
    }
}

/// Document id plus an optional tab (`gid`).
fn extract_sheet(url: &str) -> Option<PlatformCapture> {
    let sheet_id = capture(&SHEET_ID, url)?;
    let tab = capture(&SHEET_TAB, url);

    Some(PlatformCapture {
        item_id: sheet_id.to_string(),
        extra: tab.map(ReferenceExtra::sheet_tab),
    })
}

fn build_sheet(capture: &PlatformCapture) -> String {
    let tab = capture.extra.as_ref().and_then(|e| e.sheet_tab.as_deref());
    match tab {
        Some(gid) => format!(
            "https://docs.google.com/spreadsheets/d/{}/edit#gid={gid}",
            capture.item_id
        ),
        None => format!(
            "https://docs.google.com/spreadsheets/d/{}/edit",
            capture.item_id
        ),
    }
}

/// Taobao reverse image search for an image URL.
pub fn taobao_image_search_url(image_url: &str) -> String {
    format!(
        "https://s.taobao.com/search?imgfile={}&imgid=&commend=all&ssid=s5-e&search_type=item&sourceId=tb.index&spm=a21bo.2017.201856-taobao-item.2&ie=utf8&initiative_id=tbindexz_20170306",
        urlencoding::encode(image_url)
    )
}
