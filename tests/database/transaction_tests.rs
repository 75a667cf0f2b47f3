use crate::{common::init_test_env, test_helpers::TestDatabase};
use marathon_processor::{database::db::DbClient, utils::test_utils::generate_participant};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn test_persist_rolls_back_when_a_participant_has_no_result() {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    test_db.seed_round(30001, None).await.expect("Failed to seed");
    test_db.seed_result(30001, 1, "Y", "70.00").await.expect("Failed to seed");
    test_db.seed_result(30001, 2, "Y", "50.00").await.expect("Failed to seed");

    let db = DbClient::connect(&test_db.connection_string).await.expect("Failed to connect");

    let mut first = generate_participant(1, "70.00", 0, 0, 0);
    first.new_rating = Some(1250);
    first.new_volatility = Some(385);

    // Second participant never went through the engine
    let second = generate_participant(2, "50.00", 0, 0, 0);

    let result = db.persist_results(30001, &[first, second]).await;
    assert!(result.is_err());

    // The whole pass rolled back: no rating rows, no result updates, round
    // flag untouched
    let client = test_db.get_client().await.expect("Failed to get client");

    let ratings: i64 = client
        .query_one("SELECT COUNT(*) FROM algo_rating", &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(ratings, 0);

    let written: i64 = client
        .query_one("SELECT COUNT(*) FROM long_comp_result WHERE new_rating IS NOT NULL", &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(written, 0);

    let rated: i32 = client
        .query_one("SELECT rated_ind FROM round WHERE round_id = 30001", &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(rated, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Docker daemon"]
async fn test_persist_of_empty_pass_only_flips_the_round() {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    test_db.seed_round(30002, None).await.expect("Failed to seed");

    let db = DbClient::connect(&test_db.connection_string).await.expect("Failed to connect");
    db.persist_results(30002, &[]).await.unwrap();

    let client = test_db.get_client().await.expect("Failed to get client");
    let rated: i32 = client
        .query_one("SELECT rated_ind FROM round WHERE round_id = 30002", &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(rated, 1);
}
