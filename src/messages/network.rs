//! Network messages - communication between App and Network layers

use crate::error::ApiResult;
use crate::models::{
    AuthResponse, Category, ExpensePage, ExpensePayload, ExpenseQuery, SavedExpense,
    SigninRequest, SignupRequest, User,
};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    Signup {
        id: u64,
        request: SignupRequest,
    },
    Signin {
        id: u64,
        request: SigninRequest,
    },
    /// Best-effort server side sign out
    Signout {
        id: u64,
    },
    FetchProfile {
        id: u64,
    },
    /// Fetch one page of expenses
    FetchExpenses {
        id: u64,
        query: ExpenseQuery,
    },
    CreateExpense {
        id: u64,
        payload: ExpensePayload,
    },
    UpdateExpense {
        id: u64,
        expense_id: String,
        payload: ExpensePayload,
    },
    DeleteExpense {
        id: u64,
        expense_id: String,
    },
    FetchCategories {
        id: u64,
    },
    CreateCategory {
        id: u64,
        title: String,
    },
    /// Bearer token for subsequent requests; `None` signs the client out
    SetToken(Option<String>),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Signup {
        id: u64,
        result: ApiResult<AuthResponse>,
    },
    Signin {
        id: u64,
        result: ApiResult<AuthResponse>,
    },
    Signout {
        id: u64,
        result: ApiResult<()>,
    },
    Profile {
        id: u64,
        result: ApiResult<User>,
    },
    Expenses {
        id: u64,
        result: ApiResult<ExpensePage>,
    },
    ExpenseCreated {
        id: u64,
        result: ApiResult<SavedExpense>,
    },
    ExpenseUpdated {
        id: u64,
        result: ApiResult<SavedExpense>,
    },
    ExpenseDeleted {
        id: u64,
        expense_id: String,
        result: ApiResult<()>,
    },
    Categories {
        id: u64,
        result: ApiResult<Vec<Category>>,
    },
    CategoryCreated {
        id: u64,
        result: ApiResult<Category>,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Signup { id, .. }
            | NetworkResponse::Signin { id, .. }
            | NetworkResponse::Signout { id, .. }
            | NetworkResponse::Profile { id, .. }
            | NetworkResponse::Expenses { id, .. }
            | NetworkResponse::ExpenseCreated { id, .. }
            | NetworkResponse::ExpenseUpdated { id, .. }
            | NetworkResponse::ExpenseDeleted { id, .. }
            | NetworkResponse::Categories { id, .. }
            | NetworkResponse::CategoryCreated { id, .. } => *id,
        }
    }

    /// Whether the server rejected the session token
    pub fn is_unauthorized(&self) -> bool {
        fn rejected<T>(result: &ApiResult<T>) -> bool {
            matches!(result, Err(e) if e.is_unauthorized())
        }

        match self {
            NetworkResponse::Signup { result, .. } | NetworkResponse::Signin { result, .. } => {
                rejected(result)
            }
            NetworkResponse::Signout { result, .. }
            | NetworkResponse::ExpenseDeleted { result, .. } => rejected(result),
            NetworkResponse::Profile { result, .. } => rejected(result),
            NetworkResponse::Expenses { result, .. } => rejected(result),
            NetworkResponse::ExpenseCreated { result, .. }
            | NetworkResponse::ExpenseUpdated { result, .. } => rejected(result),
            NetworkResponse::Categories { result, .. } => rejected(result),
            NetworkResponse::CategoryCreated { result, .. } => rejected(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_unauthorized_detection() {
        let rejected = NetworkResponse::Expenses {
            id: 4,
            result: Err(ApiError::Unauthorized),
        };
        assert_eq!(rejected.id(), 4);
        assert!(rejected.is_unauthorized());

        let timed_out = NetworkResponse::Categories {
            id: 5,
            result: Err(ApiError::Timeout),
        };
        assert!(!timed_out.is_unauthorized());
    }
}
