use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::Client;
use domain::TodoError;
use shared::Config;
use tracing::{error, info};

#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));
        if let Some(endpoint) = &config.dynamodb_endpoint {
            info!(endpoint = %endpoint, "DynamoDBエンドポイントを上書きします");
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        Self::from_client(Client::new(&aws_config), &config.dynamodb_table)
    }

    /// 構築済みの SDK クライアントから作成（DynamoDB Local のテスト用）
    pub fn from_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// SDK エラーをストアエラーに変換（詳細はログのみ）
    pub fn convert_error<E, R>(&self, e: SdkError<E, R>) -> TodoError
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let message = DisplayErrorContext(&e).to_string();
        error!(table = %self.table_name, error = %message, "DynamoDB操作に失敗しました");
        TodoError::store(message)
    }
}
