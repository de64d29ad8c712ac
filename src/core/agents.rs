//! Built-in shipping agent table.
//!
//! Entries are snapshotted from the agents' live URL formats; the order here
//! is the registry order reported to callers and the order hostnames are
//! matched in.

use once_cell::sync::Lazy;
use regex::Regex;

use super::grammar::{
    pattern, AgentCapture, AgentGrammar, CapturedPlatform, CodedRequest, EmbedRequest,
};
use super::ids::PlatformId;
use super::registry::PlatformCode::{self, Token, Unsupported};

static CSSBUY_ITEM: Lazy<Regex> = Lazy::new(|| pattern(r"/item-(?:([^-/]+)-)?(\d+)\.html"));

/// Built-in agent grammars in registry order.
pub fn builtin_agents() -> Vec<AgentGrammar> {
    vec![
        // Query parameter based
        AgentGrammar::query(
            "mycnbox.com",
            "MyCNBox",
            r"[?&]itemId=([^&#]+)",
            r"[?&]mallType=([^&#]+)",
            |r| {
                format!(
                    "https://mycnbox.com/goodsDetail?mallType={}&itemId={}",
                    r.token(),
                    r.item_id
                )
            },
        ),
        AgentGrammar::query(
            "joyagoo.com",
            "Joyagoo",
            r"[?&]id=([^&#]+)",
            r"[?&]platform=([^&#]+)",
            |r| format!("https://joyagoo.com/product?id={}&platform={}", r.item_id, r.token()),
        ),
        AgentGrammar::query(
            "acbuy.com",
            "ACbuy",
            r"[?&]id=([^&#]+)",
            r"[?&]source=([^&#]+)",
            |r| format!("https://www.acbuy.com/product?id={}&source={}", r.item_id, r.token()),
        ),
        AgentGrammar::query(
            "cnfans.com",
            "CNFans",
            r"[?&]id=([^&#]+)",
            r"[?&]platform=([^&#]+)",
            |r| format!("https://cnfans.com/product?id={}&platform={}", r.item_id, r.token()),
        ),
        AgentGrammar::query(
            "mulebuy.com",
            "MuleBuy",
            r"[?&]id=([^&#]+)",
            r"[?&]platform=([^&#]+)",
            build_mulebuy,
        )
        .forwarding_original_url(),
        AgentGrammar::query(
            "lovegobuy.com",
            "LoveGoBuy",
            r"[?&]id=([^&#]+)",
            r"[?&]shop_type=([^&#]+)",
            |r| {
                format!(
                    "https://www.lovegobuy.com/product?id={}&shop_type={}",
                    r.item_id,
                    r.token()
                )
            },
        ),
        AgentGrammar::query(
            "npbuy.com",
            "NPBuy",
            r"[?&]itemId=([^&#]+)",
            r"[?&]source=([^&#]+)",
            |r| {
                format!(
                    "https://www.npbuy.com/goods-detail?itemId={}&source={}",
                    r.item_id,
                    r.token()
                )
            },
        ),
        AgentGrammar::query(
            "gtbuy.com",
            "GTBuy",
            r"[?&]keyword=([^&#]+)",
            r"[?&]platform=([^&#]+)",
            |r| {
                format!(
                    "https://www.gtbuy.com/goods/detail?keyword={}&platform={}",
                    r.item_id,
                    r.token()
                )
            },
        ),
        AgentGrammar::query(
            "ootdbuy.com",
            "OOTDBuy",
            r"[?&]id=([^&#]+)",
            r"[?&]channel=([^&#]+)",
            |r| {
                format!(
                    "https://www.ootdbuy.com/goods/details?id={}&channel={}",
                    r.item_id,
                    r.token()
                )
            },
        ),
        AgentGrammar::query(
            "orientdig.com",
            "OrientDig",
            r"[?&]id=([^&#]+)",
            r"[?&]platform=([^&#]+)",
            |r| format!("https://orientdig.com/product?id={}&platform={}", r.item_id, r.token()),
        ),
        AgentGrammar::query(
            "niuniubox.com",
            "NiuNiuBox",
            r"[?&]id=([^&#]+)",
            r"[?&]platform=([^&#]+)",
            |r| {
                format!(
                    "https://niuniubox.com/product-detail/?platform={}&id={}",
                    r.token(),
                    r.item_id
                )
            },
        ),
        // Encoded original URL
        AgentGrammar::encoded("superbuy.com", "Superbuy", r"[?&]url=([^&#]+)", 1, |r| {
            format!(
                "https://www.superbuy.com/en/page/buy/?nTag=Home-search&from=search-input&url={}",
                urlencoding::encode(r.original_url)
            )
        }),
        AgentGrammar::encoded(
            "sugargoo.com",
            "Sugargoo",
            r"[?&]productLink=([^&#]+)",
            2,
            |r| {
                format!(
                    "https://www.sugargoo.com/productDetail?productLink={}",
                    double_encode(r.original_url)
                )
            },
        ),
        AgentGrammar::encoded("itaobuy.com", "ITaoBuy", r"[?&]url=([^&#]+)", 1, |r| {
            format!(
                "https://www.itaobuy.com/product-detail?url={}",
                urlencoding::encode(r.original_url)
            )
        }),
        AgentGrammar::encoded(
            "allchinabuy.com",
            "AllChinaBuy",
            r"[?&]url=([^&#]+)",
            1,
            |r| {
                format!(
                    "https://www.allchinabuy.com/en/page/buy/?nTag=Home-search&from=search-input&_search=url&position=&url={}",
                    urlencoding::encode(r.original_url)
                )
            },
        ),
        // LoongBuy takes the URL unencoded; parsing still decodes once.
        AgentGrammar::encoded("loongbuy.com", "LoongBuy", r"[?&]url=([^&#]+)", 1, |r| {
            format!("https://www.loongbuy.com/product-details?url={}", r.original_url)
        }),
        AgentGrammar::encoded(
            "eastmallbuy.com",
            "EastMallBuy",
            r"[?&]url=([^&#]+)",
            1,
            |r| {
                format!(
                    "https://www.eastmallbuy.com/index/item/index.html?tp={}&tid=&searchlang=en&url={}&inviter=daxxyyy",
                    r.code.unwrap_or("taobao"),
                    urlencoding::encode(r.original_url)
                )
            },
        ),
        AgentGrammar::encoded("hubbuycn.com", "HubbuyCN", r"[?&]url=([^&#]+)", 1, build_hubbuycn),
        AgentGrammar::encoded("pantherbuy.com", "PantherBuy", r"[?&]url=([^&#]+)", 1, |r| {
            format!(
                "https://pantherbuy.com/index/item/index.html?tp=micro&tid=&searchlang=en&url={}",
                urlencoding::encode(r.original_url)
            )
        }),
        AgentGrammar::encoded(
            "wemimi.com",
            "WeMiMi",
            r"[?&]productLink=([^&#]+)",
            2,
            |r| {
                format!(
                    "https://www.wemimi.com/#/home/productDetail?productLink={}",
                    double_encode(r.original_url)
                )
            },
        ),
        // Path based
        AgentGrammar::path("hoobuy.com", "Hoobuy", r"/product/(\d+)/(\d+)", |r| {
            format!("https://hoobuy.com/product/{}/{}", r.token(), r.item_id)
        }),
        AgentGrammar::path(
            "basetao.com",
            "BaseTao",
            r"/agent/([^/]+)/(\d+)\.html",
            |r| {
                format!(
                    "https://www.basetao.com/best-taobao-agent-service/products/agent/{}/{}.html",
                    r.token(),
                    r.item_id
                )
            },
        ),
        AgentGrammar::path("oopbuy.com", "OopBuy", r"/product/([^/]+)/(\d+)", |r| {
            format!("https://oopbuy.com/product/{}/{}", r.token(), r.item_id)
        }),
        AgentGrammar::path("hipobuy.com", "HipoBuy", r"/product/([^/]+)/(\d+)", |r| {
            format!("https://hipobuy.com/product/{}/{}", r.token(), r.item_id)
        }),
        AgentGrammar::path("usfans.com", "USFans", r"/product/(\d+)/(\d+)", |r| {
            format!("https://www.usfans.com/product/{}/{}", r.token(), r.item_id)
        }),
        // Special
        AgentGrammar::special("cssbuy.com", "CSSBuy", extract_cssbuy, build_cssbuy),
    ]
}

/// Platform codes per marketplace. Agents that embed the original URL and
/// need no code are filled in as implicit by the registry.
pub const BUILTIN_CODES: &[(PlatformId, &[(&str, PlatformCode)])] = &[
    (
        PlatformId::TAOBAO,
        &[
            ("mycnbox.com", Token("taobao")),
            ("joyagoo.com", Token("TAOBAO")),
            ("acbuy.com", Token("TB")),
            ("cnfans.com", Token("TAOBAO")),
            ("mulebuy.com", Token("TAOBAO")),
            ("lovegobuy.com", Token("taobao")),
            ("npbuy.com", Token("TB")),
            ("gtbuy.com", Token("taobao")),
            ("ootdbuy.com", Token("TAOBAO")),
            ("orientdig.com", Token("TAOBAO")),
            ("niuniubox.com", Token("taobao")),
            ("eastmallbuy.com", Token("taobao")),
            ("hubbuycn.com", Token("taobao")),
            ("hoobuy.com", Token("1")),
            ("basetao.com", Token("taobao")),
            ("oopbuy.com", Token("1")),
            ("hipobuy.com", Token("1")),
            ("usfans.com", Token("2")),
            ("cssbuy.com", Token("taobao")),
        ],
    ),
    // Most agents file Tmall under their Taobao code.
    (
        PlatformId::TMALL,
        &[
            ("mycnbox.com", Token("taobao")),
            ("joyagoo.com", Token("TAOBAO")),
            ("acbuy.com", Token("TB")),
            ("cnfans.com", Token("TAOBAO")),
            ("mulebuy.com", Token("TAOBAO")),
            ("lovegobuy.com", Token("taobao")),
            ("npbuy.com", Unsupported),
            ("gtbuy.com", Token("taobao")),
            ("ootdbuy.com", Token("TAOBAO")),
            ("orientdig.com", Token("TAOBAO")),
            ("niuniubox.com", Token("tmall")),
            ("eastmallbuy.com", Token("taobao")),
            ("hubbuycn.com", Token("taobao")),
            ("hoobuy.com", Unsupported),
            ("basetao.com", Token("taobao")),
            ("oopbuy.com", Token("1")),
            ("hipobuy.com", Token("1")),
            ("usfans.com", Token("2")),
            ("cssbuy.com", Token("tmall")),
        ],
    ),
    (
        PlatformId::WEIDIAN,
        &[
            ("mycnbox.com", Token("weidian")),
            ("joyagoo.com", Token("WEIDIAN")),
            ("acbuy.com", Token("WD")),
            ("cnfans.com", Token("WEIDIAN")),
            ("mulebuy.com", Token("WEIDIAN")),
            ("lovegobuy.com", Token("weidian")),
            ("npbuy.com", Token("WD")),
            ("gtbuy.com", Token("weidian")),
            ("ootdbuy.com", Token("weidian")),
            ("orientdig.com", Token("WEIDIAN")),
            ("niuniubox.com", Token("micro")),
            ("eastmallbuy.com", Token("taobao")),
            ("hubbuycn.com", Token("micro")),
            ("hoobuy.com", Token("2")),
            ("basetao.com", Token("weidian")),
            ("oopbuy.com", Token("weidian")),
            ("hipobuy.com", Token("weidian")),
            ("usfans.com", Token("3")),
            ("cssbuy.com", Token("micro")),
        ],
    ),
    (
        PlatformId::ALI_1688,
        &[
            ("mycnbox.com", Token("1688")),
            ("joyagoo.com", Token("ALI_1688")),
            ("acbuy.com", Token("AL")),
            ("cnfans.com", Token("ALI_1688")),
            ("mulebuy.com", Unsupported),
            ("lovegobuy.com", Token("ali_1688")),
            ("npbuy.com", Token("AL")),
            ("gtbuy.com", Token("1688")),
            ("ootdbuy.com", Token("1688")),
            ("orientdig.com", Token("ALI_1688")),
            ("niuniubox.com", Token("1688")),
            ("eastmallbuy.com", Token("1688")),
            ("hubbuycn.com", Token("1688")),
            ("hoobuy.com", Unsupported),
            ("basetao.com", Token("1688")),
            ("oopbuy.com", Token("0")),
            ("hipobuy.com", Token("0")),
            ("usfans.com", Token("1")),
            ("cssbuy.com", Token("1688")),
        ],
    ),
];

/// Code a CSSBuy URL without a platform prefix stands for.
const CSSBUY_DEFAULT_CODE: &str = "taobao";

fn build_mulebuy(r: &CodedRequest<'_>) -> String {
    let base = format!(
        "https://mulebuy.com/product?id={}&platform={}",
        r.item_id,
        r.token()
    );
    match r.original_url {
        Some(original) => format!("{base}&searchInfo={}", urlencoding::encode(original)),
        None => base,
    }
}

/// HubbuyCN keeps 1688 items on a separate page.
fn build_hubbuycn(r: &EmbedRequest<'_>) -> String {
    let encoded = urlencoding::encode(r.original_url);
    let tp = r.code.unwrap_or("taobao");
    let page = if tp == "1688" { "index1688.html" } else { "index.html" };
    format!(
        "https://hubbuycn.com/index/item/{page}?tp={tp}&tid=&searchlang=en&url={encoded}&inviter=blehbleh2"
    )
}

/// `/item-<id>.html` or `/item-<code>-<id>.html`.
fn extract_cssbuy(url: &str) -> Option<AgentCapture> {
    let caps = CSSBUY_ITEM.captures(url)?;
    let code = caps.get(1).map_or(CSSBUY_DEFAULT_CODE, |m| m.as_str());

    Some(AgentCapture {
        item_id: caps.get(2)?.as_str().to_string(),
        platform: CapturedPlatform::Code(code.to_string()),
    })
}

/// Taobao and Tmall share the unprefixed form.
fn build_cssbuy(r: &CodedRequest<'_>) -> String {
    match r.code {
        Some(code @ ("1688" | "micro")) => {
            format!("https://www.cssbuy.com/item-{code}-{}.html", r.item_id)
        }
        _ => format!("https://www.cssbuy.com/item-{}.html", r.item_id),
    }
}

fn double_encode(url: &str) -> String {
    urlencoding::encode(&urlencoding::encode(url)).into_owned()
}
