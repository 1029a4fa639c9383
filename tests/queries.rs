use rstest::rstest;
use skc::{dump, parse, Error, Tree};

const NETWORK: &str = "\
# interfaces
net {
    eth0 {
        addr = 10.0.0.2;
        dns = 10.0.0.1, \"10.0.0.254\";
    }
    wlan0.addr = 192.168.1.20;
    wlan0.up;
}
network.name = lab;
quiet;
";

fn values(tree: &Tree, key: &str) -> Vec<String> {
    tree.find_values(None, key)
        .expect("leaf key")
        .map(|id| tree.text(id).unwrap_or_default().to_string())
        .collect()
}

#[rstest]
#[case("a.b.c = 1;\na.b.d = 2;", "a { b { c = 1; d = 2; } }")]
#[case("a.b.c = 1;\na.b.d = 2;", "a.b { c = 1; d = 2 }")]
#[case("a.b.c = 1;\na.b.d = 2;", "a { b.c = 1; }\na.b { d = 2; }")]
#[case("x.y; x.z = 1, 2;", "x { y; z = 1,\n 2 }")]
fn dotted_and_block_forms_build_the_same_tree(#[case] dotted: &str, #[case] block: &str) {
    let dotted = parse(dotted).unwrap();
    let block = parse(block).unwrap();
    assert_eq!(dump(&dotted), dump(&block));
    assert_eq!(skc::show_tree(&dotted), skc::show_tree(&block));
}

#[rstest]
#[case("a = 1;\na = 2;", "a", vec!["2"])]
#[case("a = 1, 2, 3;\na = 4;", "a", vec!["4"])]
#[case("a = 1;\na = x, y;", "a", vec!["x", "y"])]
#[case("a { b = 1; }\na.b = 3;", "a.b", vec!["3"])]
#[case("a.b = 1;\na { b = 2 }\na.b = 3;", "a.b", vec!["3"])]
fn last_written_value_wins(#[case] input: &str, #[case] key: &str, #[case] expected: Vec<&str>) {
    let tree = parse(input).unwrap();
    assert_eq!(values(&tree, key), expected);
    assert_eq!(
        tree.find_value(None, key).map(|(value, _)| value),
        expected.first().copied()
    );
}

#[rstest]
fn composed_keys_find_their_nodes() {
    let tree = parse(NETWORK).unwrap();
    for (id, node) in tree.nodes() {
        let key = tree.compose_key(id).unwrap();
        let owner = if node.is_value() {
            tree.parent(id).unwrap()
        } else {
            id
        };
        assert_eq!(tree.find_node(None, &key), Some(owner), "key {key}");
    }
}

#[rstest]
#[case("net.eth0.addr", Some("10.0.0.2"))]
#[case("net.eth0.dns", Some("10.0.0.1"))]
#[case("net.wlan0.addr", Some("192.168.1.20"))]
#[case("net.wlan0.up", Some(""))]
#[case("network.name", Some("lab"))]
#[case("quiet", Some(""))]
#[case("net", None)]
#[case("net.eth0", None)]
#[case("net.eth", None)]
#[case("net.eth0.addr.extra", None)]
#[case("quiet.extra", None)]
#[case("", None)]
fn lookups_match_whole_words(#[case] key: &str, #[case] expected: Option<&str>) {
    let tree = parse(NETWORK).unwrap();
    assert_eq!(tree.find_value(None, key).map(|(value, _)| value), expected);
}

#[rstest]
fn lookups_relative_to_a_scope() {
    let tree = parse(NETWORK).unwrap();
    let eth0 = tree.find_node(None, "net.eth0").unwrap();
    assert_eq!(tree.find_value(Some(eth0), "addr").map(|(v, _)| v), Some("10.0.0.2"));
    assert_eq!(tree.compose_key_after(Some(eth0), tree.find_node(Some(eth0), "dns").unwrap()).unwrap(), "dns");
    assert!(tree.find_value(Some(eth0), "net.eth0.addr").is_none());
}

#[rstest]
fn array_values_keep_order() {
    let tree = parse(NETWORK).unwrap();
    assert_eq!(values(&tree, "net.eth0.dns"), vec!["10.0.0.1", "10.0.0.254"]);
    let (_, first) = tree.find_value(None, "net.eth0.dns").unwrap();
    assert!(tree.is_array(first.unwrap()));
    let (_, single) = tree.find_value(None, "net.eth0.addr").unwrap();
    assert!(!tree.is_array(single.unwrap()));
}

#[rstest]
fn key_values_walk_leaves_in_document_order() {
    let tree = parse(NETWORK).unwrap();
    let listed: Vec<_> = tree
        .key_values(None)
        .map(|(leaf, value)| (tree.compose_key(leaf).unwrap(), value))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("net.eth0.addr".to_string(), "10.0.0.2"),
            ("net.eth0.dns".to_string(), "10.0.0.1"),
            ("net.wlan0.addr".to_string(), "192.168.1.20"),
            ("net.wlan0.up".to_string(), ""),
            ("network.name".to_string(), "lab"),
            ("quiet".to_string(), ""),
        ]
    );
}

#[rstest]
fn key_values_under_a_scope() {
    let tree = parse(NETWORK).unwrap();
    let wlan0 = tree.find_node(None, "net.wlan0");
    let mut leaf = None;
    assert_eq!(tree.find_next_key_value(wlan0, &mut leaf), Some("192.168.1.20"));
    assert_eq!(tree.compose_key_after(wlan0, leaf.unwrap()).unwrap(), "addr");
    assert_eq!(tree.find_next_key_value(wlan0, &mut leaf), Some(""));
    assert_eq!(tree.find_next_key_value(wlan0, &mut leaf), None);
    assert!(leaf.is_none());
}

#[rstest]
#[case("net", vec!["10.0.0.2", "10.0.0.1", "10.0.0.254", "192.168.1.20", ""])]
#[case("net.eth0", vec!["10.0.0.2", "10.0.0.1", "10.0.0.254"])]
#[case("net.eth0.dns", vec!["10.0.0.1", "10.0.0.254"])]
#[case("network", vec!["lab"])]
#[case("quiet", vec![""])]
#[case("netw", vec![])]
#[case("net.eth1", vec![])]
#[case("zzz", vec![])]
fn prefix_iteration(#[case] prefix: &str, #[case] expected: Vec<&str>) {
    let tree = parse(NETWORK).unwrap();
    let found: Vec<_> = tree.iter_prefix(prefix).collect();
    assert_eq!(found, expected);
}

#[rstest]
fn prefix_iteration_reports_remaining_key() {
    let tree = parse(NETWORK).unwrap();
    let mut iter = tree.iter_prefix("net.wlan0");
    assert_eq!(iter.prefix(), "net.wlan0");
    assert_eq!(iter.matched_len(), "net.wlan0".len());

    assert_eq!(iter.next(), Some("192.168.1.20"));
    assert_eq!(iter.unmatched_key().unwrap(), "addr");
    assert_eq!(iter.next(), Some(""));
    assert_eq!(iter.unmatched_key().unwrap(), "up");
    assert!(iter.value_node().is_none());
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);
}

#[rstest]
fn prefix_iterator_is_restartable_by_creating_a_new_one() {
    let tree = parse("a.b = 1; a.c = 2;").unwrap();
    let first: Vec<_> = tree.iter_prefix("a").collect();
    let second: Vec<_> = tree.iter_prefix("a").collect();
    assert_eq!(first, second);
}

#[rstest]
fn composed_key_length_is_bounded() {
    let word = "k".repeat(skc::constants::KEYLEN_MAX - 1);
    let tree = parse(&format!("{word} = 1;")).unwrap();
    let node = tree.find_node(None, &word).unwrap();
    assert_eq!(tree.compose_key(node).unwrap(), word);

    let word = "k".repeat(skc::constants::KEYLEN_MAX);
    let tree = parse(&format!("{word} = 1;")).unwrap();
    let node = tree.find_node(None, &word).unwrap();
    assert_eq!(
        tree.compose_key(node).unwrap_err(),
        Error::KeyTooLong {
            limit: skc::constants::KEYLEN_MAX
        }
    );
    assert_eq!(tree.compose_key_with_limit(None, node, usize::MAX).unwrap(), word);
}

#[rstest]
fn serialized_view_mirrors_the_tree() {
    let tree = parse(NETWORK).unwrap();
    let value = serde_json::to_value(&tree).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "net": {
                "eth0": {"addr": "10.0.0.2", "dns": ["10.0.0.1", "10.0.0.254"]},
                "wlan0": {"addr": "192.168.1.20", "up": ""}
            },
            "network": {"name": "lab"},
            "quiet": ""
        })
    );
}
