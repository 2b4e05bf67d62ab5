//! Full pipeline: parse an NZB from disk, then verify its articles against
//! a scripted provider

mod common;

use common::{MockBehavior, MockNntpServer};
use nzbcheck::checker::run_check;
use nzbcheck::nzb::parse_nzb;
use nzbcheck::tls::{TlsConfig, TlsManager};
use nzbcheck::CheckerOptions;
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;

// Subject announces 3 segments, the index lists 2: one article is missing
// before the network is ever touched.
const NZB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
  <file poster="tester@example.com" date="1600000000" subject="&quot;release.part1.rar&quot; yEnc (1/3)">
    <groups><group>alt.binaries.test</group></groups>
    <segments>
      <segment bytes="7000" number="1">alpha@example.com</segment>
      <segment bytes="7000" number="2">beta@example.com</segment>
    </segments>
  </file>
  <file poster="tester@example.com" date="1600000000" subject="&quot;release.par2&quot; yEnc (1/1)">
    <groups><group>alt.binaries.test</group></groups>
    <segments>
      <segment bytes="900" number="1">gamma@example.com</segment>
    </segments>
  </file>
</nzb>
"#;

#[tokio::test]
async fn nzb_gaps_and_stat_misses_add_up() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", NZB).unwrap();

    let contents = parse_nzb(file.path(), true).unwrap();
    assert_eq!(contents.articles.len(), 3);
    assert_eq!(contents.missing_in_index, 1);

    // One of the listed segments is also gone from the provider
    let server = MockNntpServer::start(MockBehavior {
        missing: HashSet::from(["<beta@example.com>".to_string()]),
        ..MockBehavior::default()
    })
    .await;

    let options = CheckerOptions {
        quiet: true,
        watch_signals: false,
        ..CheckerOptions::default()
    };
    let report = run_check(
        &[server.profile(2, false)],
        contents.articles,
        contents.missing_in_index,
        TlsManager::new(&TlsConfig::default()).unwrap(),
        &options,
    )
    .await
    .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.checked, 3);
    // 1 from the index bookkeeping + 1 from STAT
    assert_eq!(report.missing, 2);
}
