// Activity feed endpoint

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::ActivityItem;

impl ApiClient {
    /// Recent activity across all users, newest first.
    ///
    /// `GET /api/activity/`
    pub async fn get_activity(&self) -> Result<Option<Vec<ActivityItem>>, Error> {
        self.get("/api/activity/").await
    }
}
