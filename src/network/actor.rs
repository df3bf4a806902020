//! Network actor - runs API calls in the Tokio async runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::ApiClient;

/// Network actor that executes API commands concurrently
pub struct NetworkActor {
    client: ApiClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(client: ApiClient, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::SetToken(token)) => {
                            tracing::debug!(signed_in = token.is_some(), "Updating API token");
                            self.client.set_token(token);
                        }
                        Some(NetworkCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                        Some(cmd) => self.spawn(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }

    /// Run one API call on its own task. The client is cloned with the
    /// token current at dispatch time.
    fn spawn(&mut self, cmd: NetworkCommand) {
        let client = self.client.clone();
        let response_tx = self.response_tx.clone();

        self.active_requests.spawn(async move {
            if let Some(response) = execute(&client, cmd).await {
                tracing::info!(id = response.id(), "Request completed");
                let _ = response_tx.send(response);
            }
        });
    }
}

/// Execute a command against the API. `None` for commands that are not calls.
pub async fn execute(client: &ApiClient, cmd: NetworkCommand) -> Option<NetworkResponse> {
    let response = match cmd {
        NetworkCommand::Signup { id, request } => {
            tracing::info!(id, email = %request.email, "Signing up");
            NetworkResponse::Signup {
                id,
                result: client.signup(&request).await,
            }
        }
        NetworkCommand::Signin { id, request } => {
            tracing::info!(id, email = %request.email, "Signing in");
            NetworkResponse::Signin {
                id,
                result: client.signin(&request).await,
            }
        }
        NetworkCommand::Signout { id } => NetworkResponse::Signout {
            id,
            result: client.signout().await,
        },
        NetworkCommand::FetchProfile { id } => NetworkResponse::Profile {
            id,
            result: client.profile().await,
        },
        NetworkCommand::FetchExpenses { id, query } => {
            tracing::info!(
                id,
                cursor = ?query.cursor,
                start = ?query.start_date,
                end = ?query.end_date,
                "Fetching expenses"
            );
            NetworkResponse::Expenses {
                id,
                result: client.list_expenses(&query).await,
            }
        }
        NetworkCommand::CreateExpense { id, payload } => {
            tracing::info!(id, title = %payload.title, "Creating expense");
            NetworkResponse::ExpenseCreated {
                id,
                result: client.create_expense(&payload).await,
            }
        }
        NetworkCommand::UpdateExpense {
            id,
            expense_id,
            payload,
        } => {
            tracing::info!(id, expense_id = %expense_id, "Updating expense");
            NetworkResponse::ExpenseUpdated {
                id,
                result: client.update_expense(&expense_id, &payload).await,
            }
        }
        NetworkCommand::DeleteExpense { id, expense_id } => {
            tracing::info!(id, expense_id = %expense_id, "Deleting expense");
            let result = client.delete_expense(&expense_id).await;
            NetworkResponse::ExpenseDeleted {
                id,
                expense_id,
                result,
            }
        }
        NetworkCommand::FetchCategories { id } => NetworkResponse::Categories {
            id,
            result: client.categories().await,
        },
        NetworkCommand::CreateCategory { id, title } => {
            tracing::info!(id, title = %title, "Creating category");
            NetworkResponse::CategoryCreated {
                id,
                result: client.create_category(&title).await,
            }
        }
        NetworkCommand::SetToken(_) | NetworkCommand::Shutdown => return None,
    };

    if let Some(error) = response_error(&response) {
        tracing::warn!(id = response.id(), %error, "Request failed");
    }
    Some(response)
}

fn response_error(response: &NetworkResponse) -> Option<String> {
    fn err<T>(result: &crate::error::ApiResult<T>) -> Option<String> {
        result.as_ref().err().map(|e| e.to_string())
    }

    match response {
        NetworkResponse::Signup { result, .. } | NetworkResponse::Signin { result, .. } => err(result),
        NetworkResponse::Signout { result, .. } | NetworkResponse::ExpenseDeleted { result, .. } => {
            err(result)
        }
        NetworkResponse::Profile { result, .. } => err(result),
        NetworkResponse::Expenses { result, .. } => err(result),
        NetworkResponse::ExpenseCreated { result, .. }
        | NetworkResponse::ExpenseUpdated { result, .. } => err(result),
        NetworkResponse::Categories { result, .. } => err(result),
        NetworkResponse::CategoryCreated { result, .. } => err(result),
    }
}
