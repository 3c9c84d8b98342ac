//! End-to-end scenarios across the public API.

use scratcher_ev::comparator::compare_games;
use scratcher_ev::estimator::estimate;
use scratcher_ev::feeds::detail::{DetailPage, DetailRow};
use scratcher_ev::feeds::json::parse_feed;
use scratcher_ev::feeds::listing::{extract_listing, sort_listing};
use scratcher_ev::fetch::{Proxy, ProxyChain};
use scratcher_ev::types::{EstimateInput, EstimateOptions, ScratcherError, TotalsStrategy};

use crate::mock_transport::ScriptedTransport;

const LISTING_URL: &str = "https://www.calottery.com/en/scratchers";

const LISTING_HTML: &str = r#"
<html><body>
  <nav><a href="/en/draw-games">Draw games</a></nav>
  <a href="/en/scratchers/$5/lucky-7s-1523">Lucky 7s</a>
  <a class="card" href='/en/scratchers/$2/golden-ticket-1611'><span>Golden</span> <b>Ticket</b></a>
  <a href="https://www.calottery.com/en/scratchers/$5/lucky-7s-1523">duplicate</a>
</body></html>
"#;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

#[test]
fn test_example_ticket_default_options() {
    let out = estimate(&EstimateInput::example());

    assert!(close(out.total_remaining_tickets.unwrap(), 7200.0));
    assert!(matches!(out.strategy, Some(TotalsStrategy::Anchor { .. })));
    // 1200×5 + 600×10 + 110×25 + 30×50 + 4×500 + 1×10000 = 28250
    assert!(close(out.gross_expected_value.unwrap(), 28250.0 / 7200.0));
    assert!(close(out.net_expected_value.unwrap(), 28250.0 / 7200.0 - 5.0));
    assert!(out.tiers.iter().all(|t| (0.0..=1.0).contains(&t.probability)));
}

#[test]
fn test_example_ticket_without_small_prizes() {
    let out = estimate(&EstimateInput::example().with_options(EstimateOptions {
        include_small_prizes: false,
        ..EstimateOptions::default()
    }));

    assert!(close(out.gross_expected_value.unwrap(), 12000.0 / 7200.0));
    let excluded: Vec<&str> = out
        .tiers
        .iter()
        .filter(|t| t.excluded_under_500)
        .map(|t| t.label.as_str())
        .collect();
    assert_eq!(excluded, vec!["Ticket", "$10", "$25", "$50"]);
}

#[test]
fn test_example_ticket_with_tax() {
    let out = estimate(&EstimateInput::example().with_options(EstimateOptions {
        include_small_prizes: true,
        apply_tax: true,
        tax_rate_percent: 25.0,
    }));

    // Ticket tier is untaxed; every cash tier keeps 75%.
    assert!(close(out.gross_expected_value.unwrap(), (6000.0 + 0.75 * 22250.0) / 7200.0));
    assert!(out.tiers.iter().filter(|t| t.label != "Ticket").all(|t| t.tax_applied));
}

#[test]
fn test_unestimable_ticket_is_reported_not_raised() {
    let out = estimate(&EstimateInput {
        ticket_cost: 3.0,
        prize_tiers: vec![scratcher_ev::types::PrizeTierInput::new("$3", "", 10.0, 20.0)],
        options: EstimateOptions::default(),
    });

    assert!(!out.is_estimated());
    assert_eq!(
        out.failure_reason.as_deref(),
        Some(ScratcherError::CannotEstimateTotals.to_string().as_str())
    );
}

// ---------------------------------------------------------------------------
// Feed → comparison
// ---------------------------------------------------------------------------

#[test]
fn test_feed_comparison_orders_and_flags() {
    let feed = r#"{"scratchers": [
        {"name": "Lucky 7s", "gameNumber": 1523, "price": 5, "cashOdds": "1 in 10", "overallOdds": "1 in 5",
         "prizes": [
            {"prize": "Ticket", "odds": "1 in 6", "remaining": 1200, "total": 3000},
            {"prize": "$10", "odds": "1 in 12", "remaining": 600, "total": 1500}
         ]},
        {"name": "Blank Slate", "price": "$1",
         "prizes": [{"prize": "$1", "odds": "", "remaining": 10, "total": 20}]}
    ]}"#;

    let games = parse_feed(feed, EstimateOptions::default()).unwrap();
    let rows = compare_games(&games);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Blank Slate");
    assert!(!rows[0].estimate.is_estimated());
    assert!(rows[0].calculated_cash_odds.is_none());
    assert!(rows[0].cash_odds_delta.is_none());

    assert_eq!(rows[1].name, "Lucky 7s (1523)");
    assert!(close(rows[1].remaining_winning_prizes, 1800.0));
    assert!(close(rows[1].remaining_cash_prizes, 600.0));
    assert!(close(rows[1].calculated_cash_odds.unwrap(), 12.0));
    assert!(close(rows[1].cash_odds_delta.unwrap(), 0.2));
    assert!(close(rows[1].calculated_overall_odds.unwrap(), 4.0));
    assert!(close(rows[1].overall_odds_delta.unwrap(), -0.2));
    assert!(rows[1].to_string().contains("+20.0%"));
    assert!(rows[1].to_string().contains("-20.0%"));
}

#[test]
fn test_feed_with_bad_records_still_compares() {
    let feed = r#"[
        {"name": "Lucky 7s", "price": 5,
         "prizes": [{"prize": "Ticket", "odds": "1 in 6", "remaining": 1200, "total": 3000},
                    {"prize": "$10", "odds": "1 in 12", "remaining": true, "total": 1500}]},
        {"name": "Empty", "price": 1, "prizes": null},
        {"name": "Garbled", "prizes": {"oops": 1}}
    ]"#;

    let rows = compare_games(&parse_feed(feed, EstimateOptions::default()).unwrap());
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Empty", "Lucky 7s"]);
    assert!(!rows[0].estimate.is_estimated());
    // The unreadable count is 0; the ticket anchor still sizes the pool.
    assert!(close(rows[1].estimate.total_remaining_tickets.unwrap(), 7200.0));
    assert_eq!(rows[1].remaining_cash_prizes, 0.0);
}

#[test]
fn test_detail_page_matches_structured_feed() {
    let page = DetailPage {
        name: "Lucky 7s".into(),
        cost: "$5".into(),
        game_number: "1523".into(),
        overall_odds: "1 in 3.10".into(),
        cash_odds: "1 in 5".into(),
        rows: vec![
            DetailRow::new("Ticket", "1 in 6", "1,200", "3,000"),
            DetailRow::new("$10", "1 in 12", "600", "1,500"),
            DetailRow::new("", "", "", ""),
            DetailRow::new("Total", "", "1,800", "4,500"),
        ],
    };
    let from_page = page.into_listing(None, EstimateOptions::default());

    let feed = r#"[{"name": "Lucky 7s", "gameNumber": "1523", "price": 5, "cashOdds": "1 in 5",
        "prizes": [
            {"prize": "Ticket", "odds": "1 in 6", "remaining": 1200, "total": 3000},
            {"prize": "$10", "odds": "1 in 12", "remaining": 600, "total": 1500}
        ]}]"#;
    let from_feed = parse_feed(feed, EstimateOptions::default()).unwrap();

    assert_eq!(from_page.input.prize_tiers.len(), 2);
    assert_eq!(
        estimate(&from_page.input).net_expected_value,
        estimate(&from_feed[0].input).net_expected_value
    );
}

// ---------------------------------------------------------------------------
// Proxy chain → listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_listing_via_fallback_proxy() {
    let envelope = serde_json::json!({
        "contents": LISTING_HTML,
        "status": {"http_code": 200}
    })
    .to_string();

    let transport = ScriptedTransport::new()
        .respond("https://api.allorigins.win/raw", 503, "Service Unavailable")
        .respond("https://api.allorigins.win/get", 200, &envelope);
    let chain = ProxyChain::new(transport.clone());

    let doc = chain.fetch_document(LISTING_URL).await.unwrap();
    assert_eq!(doc.proxy, Proxy::AllOriginsGet);
    assert_eq!(transport.requests().len(), 2);

    let mut entries = extract_listing(&doc.content, LISTING_URL).unwrap();
    sort_listing(&mut entries);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].price, "$2");
    assert_eq!(entries[0].name, "Golden Ticket (1611)");
    assert_eq!(entries[1].price, "$5");
    assert_eq!(entries[1].name, "Lucky 7s (1523)");
    assert_eq!(
        entries[1].url,
        "https://www.calottery.com/en/scratchers/$5/lucky-7s-1523"
    );
}

#[tokio::test]
async fn test_all_proxies_failing() {
    let transport = ScriptedTransport::new()
        .respond("https://api.allorigins.win/raw", 500, "")
        .respond("https://api.allorigins.win/get", 200, r#"{"contents": ""}"#)
        .fail("https://r.jina.ai/", "connection reset");
    let chain = ProxyChain::new(transport.clone());

    let err = chain.fetch_document(LISTING_URL).await.unwrap_err();
    match &err {
        ScratcherError::FetchFailed { attempts, details } => {
            assert_eq!(*attempts, 3);
            assert!(details.contains("HTTP 500"));
            assert!(details.contains("connection reset"));
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
    assert!(err.to_string().starts_with("Fetch failed. Tried 3 proxies."));
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn test_diagnostics_cover_every_proxy() {
    let transport = ScriptedTransport::new()
        .respond("https://api.allorigins.win/raw", 200, "<html>   raw   page </html>")
        .respond("https://api.allorigins.win/get", 200, "not json")
        .fail("https://r.jina.ai/", "timed out");
    let chain = ProxyChain::new(transport);

    let reports = chain.diagnose(LISTING_URL).await.unwrap();
    assert_eq!(reports.len(), 3);

    assert!(reports[0].ok);
    assert_eq!(reports[0].snippet.as_deref(), Some("<html> raw page </html>"));

    assert_eq!(reports[1].status, Some(200));
    assert!(reports[1].warning.as_deref().unwrap().starts_with("JSON parse error"));
    assert_eq!(reports[1].snippet.as_deref(), Some("not json"));

    assert!(!reports[2].ok);
    assert!(reports[2].error.as_deref().unwrap().contains("timed out"));
    assert!(reports[2].to_string().contains("Error: timed out"));
}

#[tokio::test]
async fn test_diagnostics_reject_bad_url() {
    let chain = ProxyChain::new(ScriptedTransport::new());
    assert!(matches!(
        chain.diagnose("   ").await,
        Err(ScratcherError::InvalidUrl(_))
    ));
    assert!(matches!(
        chain.diagnose("not a url").await,
        Err(ScratcherError::InvalidUrl(_))
    ));
}
