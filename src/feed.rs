//! IPT feed client: RSS fetch, item parsing, and annotation.
//!
//! Each IPT instance publishes its resource list as an RSS feed
//! (`rss.do`). This module fetches the raw feed text, extracts the items,
//! and annotates them into [`HarvestedResource`]s with the derived tag and
//! kingdom fields. Parsing tolerates missing elements: absent fields stay
//! empty and never fail the item.

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use std::time::Duration;

use crate::config::{Config, FeedSourceConfig};
use crate::kingdom::KingdomClassifier;
use crate::models::{HarvestedResource, RawFeedItem};
use crate::tag::extract_tag;

/// Feed fetch timeout. Feeds that take longer are treated as unavailable.
const FEED_TIMEOUT_SECS: u64 = 30;

/// Fetch the raw RSS text for one feed source.
pub async fn fetch_feed(client: &reqwest::Client, source: &FeedSourceConfig) -> Result<String> {
    let response = client
        .get(&source.rss_url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch feed for {} ({})", source.id, source.rss_url))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Feed {} returned {}: {}", source.id, status, body);
    }

    Ok(response.text().await?)
}

/// Build an HTTP client for feed fetching.
pub fn feed_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
        .build()?)
}

/// Parse RSS text into raw feed items.
///
/// Reads `title`, `link`, `guid`, `description`, and `pubDate` from each
/// `<item>`; anything else is skipped. Malformed XML is an error, which
/// the caller treats the same as a transport failure.
pub fn parse_feed_items(xml: &str) -> Result<Vec<RawFeedItem>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<RawFeedItem> = None;
    let mut field: Option<ItemField> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"item" {
                    current = Some(RawFeedItem::default());
                } else if current.is_some() {
                    field = ItemField::from_name(name.as_ref());
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    field.append(item, t.unescape().unwrap_or_default().as_ref());
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    field.append(item, String::from_utf8_lossy(&t).as_ref());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("Malformed feed XML: {}", e),
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

#[derive(Clone, Copy)]
enum ItemField {
    Title,
    Link,
    Guid,
    Description,
    PubDate,
}

impl ItemField {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(ItemField::Title),
            b"link" => Some(ItemField::Link),
            b"guid" => Some(ItemField::Guid),
            b"description" => Some(ItemField::Description),
            b"pubDate" => Some(ItemField::PubDate),
            _ => None,
        }
    }

    fn append(self, item: &mut RawFeedItem, text: &str) {
        let target = match self {
            ItemField::Title => &mut item.title,
            ItemField::Link => &mut item.link,
            ItemField::Guid => &mut item.guid,
            ItemField::Description => &mut item.description,
            ItemField::PubDate => &mut item.published_at,
        };
        target.push_str(text);
    }
}

/// Annotate a raw feed item with its source and the derived fields.
///
/// The tag comes from the primary link, falling back to the guid; the
/// kingdom comes from the title with the source's default as fallback.
/// Pure: returns a new value, the input is consumed unchanged.
pub fn annotate(
    item: RawFeedItem,
    source: &FeedSourceConfig,
    classifier: &KingdomClassifier,
) -> HarvestedResource {
    let mut tag = extract_tag(&item.link);
    if tag.is_empty() {
        tag = extract_tag(&item.guid);
    }

    let kingdom = classifier.classify(&item.title, source.default_kingdom);

    HarvestedResource {
        title: item.title,
        link: item.link,
        guid: item.guid,
        description: item.description,
        published_at: item.published_at,
        tag,
        kingdom,
        source_id: source.id.clone(),
        source_base_url: source.base_url.clone(),
    }
}

/// Fetch and print one source's feed without touching the catalog.
///
/// Debug helper behind `iptcheck feed <source-id>`.
pub async fn run_feed(config: &Config, source_id: &str) -> Result<()> {
    let source = config
        .sources
        .iter()
        .find(|s| s.id == source_id)
        .ok_or_else(|| anyhow::anyhow!("Unknown source: '{}'", source_id))?;

    let client = feed_client()?;
    let xml = fetch_feed(&client, source).await?;
    let items = parse_feed_items(&xml)?;
    let classifier = KingdomClassifier::default();

    println!("feed {} ({})", source.id, source.rss_url);
    println!("  items: {}", items.len());
    for item in items {
        let resource = annotate(item, source, &classifier);
        println!(
            "  [{}] {} (tag: '{}')",
            resource.kingdom, resource.title, resource.tag
        );
    }

    Ok(())
}
