use anyhow::Result;

use fitbot::profile::{push_turn, ProfileParams};
use fitbot::store::{InMemoryUserStore, JournalKind, UserStore};

fn sample_params() -> ProfileParams {
    ProfileParams {
        gender: "Female".to_string(),
        weight: "60".to_string(),
        height: "165".to_string(),
        age: "25".to_string(),
        health: "none".to_string(),
        goal: "Maintain".to_string(),
        activity_factor: 1.55,
    }
}

#[tokio::test]
async fn test_journal_newest_first_with_limit() -> Result<()> {
    let store = InMemoryUserStore::new();
    store.upsert_user("9", "D").await?;

    for day in 1..=7 {
        store
            .add_entry("9", JournalKind::Progress, &format!("day {day}"))
            .await?;
    }
    store.add_entry("9", JournalKind::Diary, "oatmeal").await?;

    let entries = store.recent_entries("9", JournalKind::Progress, 5).await?;
    let texts: Vec<_> = entries.iter().map(|entry| entry.text.as_str()).collect();
    assert_eq!(texts, ["day 7", "day 6", "day 5", "day 4", "day 3"]);
    assert!(entries.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let diary = store.recent_entries("9", JournalKind::Diary, 5).await?;
    assert_eq!(diary.len(), 1);
    assert!(store
        .recent_entries("other", JournalKind::Diary, 5)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_goal_update_keeps_other_params() -> Result<()> {
    let store = InMemoryUserStore::new();
    store.upsert_user("3", "E").await?;
    store.save_params("3", &sample_params()).await?;

    assert!(store.update_goal("3", "Muscle gain").await?);

    let params = store.get_user("3").await?.unwrap().params.unwrap();
    assert_eq!(params.goal, "Muscle gain");
    assert_eq!(params.weight, "60");
    assert_eq!(params.activity_factor, 1.55);
    Ok(())
}

#[tokio::test]
async fn test_history_is_persisted() -> Result<()> {
    let store = InMemoryUserStore::new();
    let mut profile = store.upsert_user("4", "F").await?;

    push_turn(&mut profile.history, "How many squats?", "Three sets of ten.", 10);
    store.save_history("4", &profile.history).await?;

    let stored = store.get_user("4").await?.unwrap();
    assert_eq!(stored.history, profile.history);
    assert_eq!(stored.history.len(), 2);
    Ok(())
}
