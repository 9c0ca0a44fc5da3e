use std::fs;
use std::path::PathBuf;

use netthud::news::build_news;
use netthud::rss::{self, Feed, FeedItem};
use netthud::transfers::{TransferStatus, build_transfers};

const BBC_URL: &str = "https://feeds.bbci.co.uk/sport/football/rss.xml";
const ATOM_URL: &str = "https://www.terrace.example/feed.atom";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn both_feeds() -> Vec<FeedItem> {
    let mut items = rss::parse_feed(&read_fixture("bbc_football.xml"), BBC_URL).items;
    items.extend(rss::parse_feed(&read_fixture("atom_football.xml"), ATOM_URL).items);
    items
}

#[test]
fn parses_rss_fixture() {
    let feed = rss::parse_feed(&read_fixture("bbc_football.xml"), BBC_URL);
    assert_eq!(feed.title.as_deref(), Some("BBC Sport - Football"));
    // The blank-titled item is dropped.
    assert_eq!(feed.items.len(), 4);

    let first = &feed.items[0];
    assert_eq!(first.title, "Arsenal beat Fulham to go top");
    assert_eq!(first.link, "https://www.bbc.co.uk/sport/football/articles/a1");
    assert_eq!(
        first.summary.as_deref(),
        Some(
            "Arsenal climb to the top of the Premier League \
             with a 3-1 win over Fulham at the Emirates."
        )
    );
    assert_eq!(first.image.as_deref(), Some("https://ichef.bbci.co.uk/images/a1.jpg"));
    assert_eq!(first.published_rfc3339().as_deref(), Some("2026-10-17T17:05:00Z"));
    assert_eq!(first.source, "BBC Sport - Football");

    assert_eq!(feed.items[1].title, "Chelsea agree £40m fee for Ajax striker");
}

#[test]
fn parses_atom_fixture() {
    let feed = rss::parse_feed(&read_fixture("atom_football.xml"), ATOM_URL);
    assert_eq!(feed.title.as_deref(), Some("Terrace Talk"));
    assert_eq!(feed.items.len(), 2);

    let first = &feed.items[0];
    assert_eq!(first.link, "https://terrace.example/posts/liverpool-winger");
    assert_eq!(first.summary.as_deref(), Some("Scouts were at the weekend game again."));
    assert_eq!(first.published_rfc3339().as_deref(), Some("2026-10-19T06:45:00Z"));

    let second = &feed.items[1];
    assert_eq!(second.link, "https://terrace.example/posts/derby-preview");
    assert_eq!(second.summary.as_deref(), Some("Everything you need before kick-off."));
}

#[test]
fn untitled_feed_falls_back_to_host() {
    let raw = "<rss><channel><item><title>Hello</title>\
               <link>https://x.example/1</link></item></channel></rss>";
    let feed = rss::parse_feed(raw, "https://www.x.example/rss");
    assert_eq!(feed.title, None);
    assert_eq!(feed.items[0].source, "x.example");
}

#[test]
fn items_without_a_link_are_skipped() {
    let raw = "<rss><channel><title>X</title>\
               <item><title>No link here</title>\
               <pubDate>Sun, 18 Oct 2026 10:00:00 GMT</pubDate></item>\
               <item><title>Linked</title><link> https://x.example/2 </link></item>\
               </channel></rss>";
    let feed = rss::parse_feed(raw, "https://x.example/rss");
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].link, "https://x.example/2");
    assert_eq!(feed.items[0].published, None);
}

#[test]
fn garbage_parses_to_nothing() {
    let feed = rss::parse_feed("<html><body>503 Service Unavailable</body></html>", BBC_URL);
    assert!(feed.items.is_empty());
}

#[test]
fn news_merges_dedups_and_sorts() {
    let news = build_news(both_feeds(), 10);
    let titles: Vec<&str> = news.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Liverpool weigh up bid for Bundesliga winger",
            "Derby day preview",
            "Midfielder completes move to Napoli",
            "Chelsea agree £40m fee for Ajax striker",
            "Arsenal beat Fulham to go top",
        ]
    );
    assert_eq!(news[0].source, "Terrace Talk");
    assert_eq!(news[4].image.as_deref(), Some("https://ichef.bbci.co.uk/images/a1.jpg"));

    assert_eq!(build_news(both_feeds(), 2).len(), 2);
}

#[test]
fn transfers_filter_and_classify() {
    let transfers = build_transfers(both_feeds(), 10);
    let titles: Vec<&str> = transfers.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Liverpool weigh up bid for Bundesliga winger",
            "Midfielder completes move to Napoli",
            "Chelsea agree £40m fee for Ajax striker",
        ]
    );
    assert_eq!(transfers[0].status, TransferStatus::Rumour);
    assert_eq!(transfers[0].fee, None);
    assert_eq!(transfers[1].status, TransferStatus::Done);
    assert_eq!(transfers[1].fee.as_deref(), Some("€30m"));
    assert_eq!(transfers[2].status, TransferStatus::Rumour);
    assert_eq!(transfers[2].fee.as_deref(), Some("£40m"));
}

#[test]
fn one_failed_feed_does_not_sink_the_rest() {
    let ok = rss::parse_feed(&read_fixture("atom_football.xml"), ATOM_URL);
    let results = vec![
        (BBC_URL.to_string(), Err(anyhow::anyhow!("timed out"))),
        (ATOM_URL.to_string(), Ok(ok)),
    ];
    let items = rss::collect_items(results).expect("one feed succeeded");
    assert_eq!(items.len(), 2);

    let all_failed: Vec<(String, anyhow::Result<Feed>)> =
        vec![(BBC_URL.to_string(), Err(anyhow::anyhow!("dns")))];
    assert!(rss::collect_items(all_failed).is_none());
}
