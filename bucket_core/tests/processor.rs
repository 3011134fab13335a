use std::sync::Arc;
use std::thread;

use bucket_core::{BucketConfig, CommandProcessor, FixedIndex, Reply, Request, SeededRandom};
use bucket_store::{StorageConfig, Store};

fn on_disk(dir: &tempfile::TempDir) -> BucketConfig {
    let mut config = BucketConfig::from_toml_str(
        r#"
        [identity]
        admins = ["Root"]
        "#,
    )
    .unwrap();
    config.storage = StorageConfig {
        path: dir.path().join("bucket"),
        temporary: false,
    };
    config
}

fn say(p: &CommandProcessor, who: &str, text: &str) -> Option<String> {
    p.handle(&Request::new(who, text)).map(|r| r.text)
}

#[test]
fn test_knowledge_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = on_disk(&dir);

    {
        let p = CommandProcessor::from_config(&config).unwrap().with_random(FixedIndex(0));
        say(&p, "alice", "foo is bar");
        say(&p, "root", "create var color");
        say(&p, "root", "add value color green");
        say(&p, "alice", "sky <reply> the sky is $color");
        p.flush().unwrap();
    }

    let p = CommandProcessor::from_config(&config).unwrap().with_random(FixedIndex(0));
    assert_eq!(say(&p, "bob", "foo").as_deref(), Some("foo is bar"));
    assert_eq!(
        p.handle(&Request::new("bob", "sky")),
        Some(Reply::channel("the sky is green"))
    );
    // The undo register lives in memory only.
    assert_eq!(
        say(&p, "bob", "undo").as_deref(),
        Some("Sorry bob, there's nothing to undo")
    );
}

#[test]
fn test_config_admins_are_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let p = CommandProcessor::from_config(&on_disk(&dir)).unwrap();
    assert_eq!(
        say(&p, "ROOT", "create var shape").as_deref(),
        Some("Ok ROOT, created variable shape")
    );
}

#[test]
fn test_seeded_recall_is_reproducible() {
    let recall = |seed| {
        let p = CommandProcessor::new(Store::temporary().unwrap(), |_: &Request| false)
            .with_random(SeededRandom::new(seed));
        for n in 0..10 {
            say(&p, "alice", &format!("number is {n}"));
        }
        (0..5).map(|_| say(&p, "bob", "number").unwrap()).collect::<Vec<_>>()
    };
    assert_eq!(recall(7), recall(7));
}

#[test]
fn test_concurrent_statements_are_all_kept() {
    let p = Arc::new(CommandProcessor::new(Store::temporary().unwrap(), |_: &Request| false));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                for n in 0..10 {
                    say(&p, "alice", &format!("counter is {t}-{n}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let fact = p.facts().lookup("counter").unwrap().unwrap();
    assert_eq!(fact.responses.len(), 80);
}

#[test]
fn test_concurrent_undo_applies_once() {
    let p = Arc::new(CommandProcessor::new(Store::temporary().unwrap(), |_: &Request| false));
    say(&p, "alice", "foo is bar");
    say(&p, "alice", "foo is baz");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let p = Arc::clone(&p);
            thread::spawn(move || say(&p, "bob", "undo").unwrap())
        })
        .collect();
    let undone = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|reply| reply.starts_with("Ok bob"))
        .count();

    assert_eq!(undone, 1);
    let fact = p.facts().lookup("foo").unwrap().unwrap();
    assert_eq!(fact.responses.len(), 1);
}
