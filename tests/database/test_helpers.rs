use lazy_static::lazy_static;
use std::sync::Arc;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio_postgres::{Client, NoTls};

pub struct TestDatabase {
    pub connection_string: String,
    _container: Container<'static, Postgres>
}

impl TestDatabase {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        lazy_static! {
            static ref DOCKER: Arc<Cli> = Arc::new(Cli::default());
        }

        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        let connection_string = format!(
            "host=localhost port={} user=postgres password=postgres dbname=postgres",
            port
        );

        let (client, connection) = tokio_postgres::connect(&connection_string, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("Database connection error: {}", e);
            }
        });

        let schema = include_str!("schema.sql");
        client.batch_execute(schema).await?;

        Ok(TestDatabase {
            connection_string,
            _container: container
        })
    }

    pub async fn get_client(&self) -> Result<Client, Box<dyn std::error::Error>> {
        let (client, connection) = tokio_postgres::connect(&self.connection_string, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("Database connection error: {}", e);
            }
        });

        Ok(client)
    }

    pub async fn seed_round(&self, round_id: i64, contest_id: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
        let client = self.get_client().await?;
        client
            .execute(
                "INSERT INTO round (round_id, contest_id, rated_ind) VALUES ($1, $2, 0)",
                &[&round_id, &contest_id]
            )
            .await?;

        Ok(())
    }

    pub async fn seed_result(
        &self,
        round_id: i64,
        coder_id: i64,
        attended: &str,
        score: &str
    ) -> Result<(), Box<dyn std::error::Error>> {
        let client = self.get_client().await?;
        client
            .execute(
                &format!(
                    "INSERT INTO long_comp_result (round_id, coder_id, attended, system_point_total) \
                     VALUES ($1, $2, $3, {score})"
                ),
                &[&round_id, &coder_id, &attended]
            )
            .await?;

        Ok(())
    }

    pub async fn seed_rating(
        &self,
        coder_id: i64,
        rating: i32,
        vol: i32,
        num_ratings: i32
    ) -> Result<(), Box<dyn std::error::Error>> {
        let client = self.get_client().await?;
        client
            .execute(
                "INSERT INTO algo_rating \
                 (coder_id, algo_rating_type_id, rating, vol, num_ratings, highest_rating, lowest_rating) \
                 VALUES ($1, 3, $2, $3, $4, $2, $2)",
                &[&coder_id, &rating, &vol, &num_ratings]
            )
            .await?;

        Ok(())
    }

    /// Seeds the reference scenario: round 10001 with two established coders
    /// and three first-timers, everyone attending
    pub async fn seed_scenario(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.seed_round(10001, Some(30100001)).await?;

        self.seed_result(10001, 1001, "Y", "95.50").await?;
        self.seed_result(10001, 1002, "Y", "88.25").await?;
        self.seed_result(10001, 1003, "Y", "72.00").await?;
        self.seed_result(10001, 1004, "Y", "60.75").await?;
        self.seed_result(10001, 1005, "Y", "45.00").await?;

        self.seed_rating(1001, 1500, 400, 5).await?;
        self.seed_rating(1002, 1350, 450, 3).await?;

        Ok(())
    }
}
