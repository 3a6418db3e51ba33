use pushbeat_core::{PushClient, PushConfig, PushPayload, PushStatus};

use crate::util::{fail, print_json};

pub async fn run(config: PushConfig, status: PushStatus, msg: String, ping: Option<u64>) -> i32 {
    let client = match PushClient::new(config) {
        Ok(client) => client,
        Err(err) => return fail(&err),
    };

    match client.push(&PushPayload::new(status, msg, ping)).await {
        Ok(receipt) => {
            print_json(&receipt);
            0
        }
        Err(err) => fail(&err),
    }
}
