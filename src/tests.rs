#[cfg(test)]
mod integration_tests {
    use crate::handlers::codewise_budgets::{AllocationInput, UpsertCodewiseBudgetRequest};
    use crate::handlers::distributions::CreateDistributionRequest;
    use crate::handlers::economic_codes::CreateEconomicCodeRequest;
    use crate::handlers::expenses::RecordExpenseRequest;
    use crate::handlers::messages::CreateMessageRequest;
    use crate::handlers::upazilas::CreateUpazilaRequest;
    use crate::handlers::users::{CreateUserRequest, UpdateUserRequest};
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// Decimal fields serialize as JSON strings; parse whatever shape arrives.
    fn as_decimal(value: &serde_json::Value) -> Decimal {
        match value {
            serde_json::Value::String(s) => Decimal::from_str(s).expect("invalid decimal string"),
            serde_json::Value::Number(n) => {
                Decimal::from_str(&n.to_string()).expect("invalid decimal number")
            }
            other => panic!("expected a decimal value, got {:?}", other),
        }
    }

    async fn create_economic_code(server: &TestServer, code: &str, total: i64) {
        let response = server
            .post("/api/v1/economic-codes")
            .json(&CreateEconomicCodeRequest {
                economic_code: code.to_string(),
                code_title: format!("Code {}", code),
                total_budget: Decimal::new(total, 0),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    async fn create_distribution(
        server: &TestServer,
        code: &str,
        uid: &str,
        amount: i64,
    ) -> axum_test::TestResponse {
        server
            .post("/api/v1/budget-distributions")
            .json(&CreateDistributionRequest {
                upazila_id: 1,
                user_uid: uid.to_string(),
                economic_code: code.to_string(),
                amount: Decimal::new(amount, 0),
                serial_code: None,
            })
            .await
    }

    async fn distributed_budget_of(server: &TestServer, code: &str) -> Decimal {
        let response = server
            .get(&format!("/api/v1/economic-codes/{}", code))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        as_decimal(&body.data["distributed_budget"])
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
    }

    // --- Users ---

    #[tokio::test]
    async fn test_create_user() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let create_request = CreateUserRequest {
            uid: "uid-100".to_string(),
            name: "Rahim Uddin".to_string(),
            email: "rahim@example.org".to_string(),
            role: None,
            photo_url: None,
        };

        let response = server.post("/api/v1/users").json(&create_request).await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "User created successfully");
        assert_eq!(body.data["uid"], "uid-100");
        // Role defaults to "user" when not supplied
        assert_eq!(body.data["role"], "user");
        assert!(body.data["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_uid() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let create_request = CreateUserRequest {
            uid: "uid-dup".to_string(),
            name: "First".to_string(),
            email: "first@example.org".to_string(),
            role: None,
            photo_url: None,
        };
        server
            .post("/api/v1/users")
            .json(&create_request)
            .await
            .assert_status(StatusCode::CREATED);

        let duplicate = CreateUserRequest {
            uid: "uid-dup".to_string(),
            name: "Second".to_string(),
            email: "second@example.org".to_string(),
            role: None,
            photo_url: None,
        };
        let response = server.post("/api/v1/users").json(&duplicate).await;

        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "USER_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_get_users() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/users").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body.success);
        // The test fixture seeds two users
        assert!(body.data.len() >= 2);
        assert!(body.data.iter().any(|u| u["uid"] == "uid-test-admin"));
    }

    #[tokio::test]
    async fn test_get_user_by_uid() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/users/uid-test-officer").await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["uid"], "uid-test-officer");
        assert_eq!(body.data["role"], "user");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/users/uid-unknown").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_user() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let update_request = UpdateUserRequest {
            name: Some("Promoted Officer".to_string()),
            email: None,
            role: Some("admin".to_string()),
            photo_url: None,
        };

        let response = server
            .put("/api/v1/users/uid-test-officer")
            .json(&update_request)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["name"], "Promoted Officer");
        assert_eq!(body.data["role"], "admin");
        // Untouched fields keep their values
        assert_eq!(body.data["email"], "officer@test.example");
    }

    #[tokio::test]
    async fn test_delete_user_reports_deletion_count() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Deleting an existing user removes exactly that record
        let response = server.delete("/api/v1/users/uid-test-officer").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["deleted_count"], 1);

        // Deleting it again reports zero removals, not an error
        let response = server.delete("/api/v1/users/uid-test-officer").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["deleted_count"], 0);
    }

    // --- Upazila directory ---

    #[tokio::test]
    async fn test_create_upazila_concatenates_codes() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let create_request = CreateUpazilaRequest {
            upazila_name: "Sadar".to_string(),
            institute_code: "120".to_string(),
            field_office_code: "045".to_string(),
        };

        let response = server.post("/api/v1/upazilas").json(&create_request).await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["full_office_code"], "120045");

        // The entry shows up in the directory listing
        let response = server.get("/api/v1/upazilas").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert!(body
            .data
            .iter()
            .any(|u| u["full_office_code"] == "120045" && u["upazila_name"] == "Sadar"));
    }

    #[tokio::test]
    async fn test_create_upazila_rejects_blank_codes() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let create_request = CreateUpazilaRequest {
            upazila_name: "Sadar".to_string(),
            institute_code: "".to_string(),
            field_office_code: "045".to_string(),
        };

        let response = server.post("/api/v1/upazilas").json(&create_request).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    // --- Economic codes ---

    #[tokio::test]
    async fn test_create_economic_code_forces_zero_distributed() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/economic-codes")
            .json(&CreateEconomicCodeRequest {
                economic_code: "3111101".to_string(),
                code_title: "Basic pay of officers".to_string(),
                total_budget: Decimal::new(50_000, 0),
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(as_decimal(&body.data["total_budget"]), Decimal::new(50_000, 0));
        assert_eq!(as_decimal(&body.data["distributed_budget"]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_create_economic_code_duplicate() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_economic_code(&server, "3111101", 1000).await;

        let response = server
            .post("/api/v1/economic-codes")
            .json(&CreateEconomicCodeRequest {
                economic_code: "3111101".to_string(),
                code_title: "Same code again".to_string(),
                total_budget: Decimal::new(9_999, 0),
            })
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "ECONOMIC_CODE_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_get_economic_code_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/economic-codes/9999999").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    // --- Balance-checked distributions ---

    #[tokio::test]
    async fn test_distribution_increments_running_total() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_economic_code(&server, "3111101", 1000).await;

        let response = create_distribution(&server, "3111101", "uid-test-officer", 600).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(as_decimal(&body.data["distributed_budget"]), Decimal::new(600, 0));
        assert_eq!(as_decimal(&body.data["expense_budget"]), Decimal::ZERO);

        assert_eq!(
            distributed_budget_of(&server, "3111101").await,
            Decimal::new(600, 0)
        );
    }

    #[tokio::test]
    async fn test_distribution_over_budget_leaves_total_unchanged() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // total 1000: 600 fits, 500 does not (only 400 remaining), 400 fills it
        create_economic_code(&server, "3111101", 1000).await;

        create_distribution(&server, "3111101", "uid-test-officer", 600)
            .await
            .assert_status(StatusCode::CREATED);

        let response = create_distribution(&server, "3111101", "uid-test-officer", 500).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "BUDGET_EXCEEDED");

        // The rejected distribution must not have touched the aggregate
        assert_eq!(
            distributed_budget_of(&server, "3111101").await,
            Decimal::new(600, 0)
        );

        create_distribution(&server, "3111101", "uid-test-officer", 400)
            .await
            .assert_status(StatusCode::CREATED);
        assert_eq!(
            distributed_budget_of(&server, "3111101").await,
            Decimal::new(1000, 0)
        );

        // Exactly two ledger rows were written
        let response = server.get("/api/v1/budget-distributions").await;
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 2);
    }

    #[tokio::test]
    async fn test_distribution_unknown_economic_code() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = create_distribution(&server, "0000000", "uid-test-officer", 100).await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "ECONOMIC_CODE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_distribution_rejects_non_positive_amount() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_economic_code(&server, "3111101", 1000).await;

        let response = create_distribution(&server, "3111101", "uid-test-officer", 0).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_AMOUNT");
        assert_eq!(distributed_budget_of(&server, "3111101").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_distribution_duplicate_serial_code() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_economic_code(&server, "3111101", 1000).await;

        let request = CreateDistributionRequest {
            upazila_id: 1,
            user_uid: "uid-test-officer".to_string(),
            economic_code: "3111101".to_string(),
            amount: Decimal::new(100, 0),
            serial_code: Some("SER-1".to_string()),
        };
        server
            .post("/api/v1/budget-distributions")
            .json(&request)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/budget-distributions")
            .json(&request)
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "DUPLICATE_SERIAL_CODE");

        // The conflicting request must not have incremented the aggregate
        assert_eq!(
            distributed_budget_of(&server, "3111101").await,
            Decimal::new(100, 0)
        );
    }

    // --- Codewise ledgers ---

    #[tokio::test]
    async fn test_codewise_upsert_creates_ledger_lazily() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // No ledger yet for this upazila
        server
            .get("/api/v1/codewise-budgets/7")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let request = UpsertCodewiseBudgetRequest {
            upazila_id: 7,
            upazila_name: "Sadar".to_string(),
            allocations: vec![
                AllocationInput {
                    economic_code: "3111101".to_string(),
                    amount: Decimal::new(500, 0),
                },
                AllocationInput {
                    economic_code: "3211106".to_string(),
                    amount: Decimal::new(200, 0),
                },
            ],
        };

        let response = server.post("/api/v1/codewise-budgets").json(&request).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["upazila_id"], 7);
        assert_eq!(body.data["upazila_name"], "Sadar");
        let allocations = body.data["allocations"].as_array().unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0]["economic_code"], "3111101");
        assert_eq!(as_decimal(&allocations[0]["amount"]), Decimal::new(500, 0));
    }

    #[tokio::test]
    async fn test_codewise_upsert_converges_to_one_entry_per_code() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let request = UpsertCodewiseBudgetRequest {
            upazila_id: 7,
            upazila_name: "Sadar".to_string(),
            allocations: vec![AllocationInput {
                economic_code: "3111101".to_string(),
                amount: Decimal::new(500, 0),
            }],
        };

        // Apply the same allocation three times, then a second code
        for _ in 0..3 {
            server
                .post("/api/v1/codewise-budgets")
                .json(&request)
                .await
                .assert_status(StatusCode::OK);
        }
        let second = UpsertCodewiseBudgetRequest {
            upazila_id: 7,
            upazila_name: "Sadar".to_string(),
            allocations: vec![AllocationInput {
                economic_code: "3211106".to_string(),
                amount: Decimal::new(50, 0),
            }],
        };
        let response = server.post("/api/v1/codewise-budgets").json(&second).await;
        response.assert_status(StatusCode::OK);

        let body: ApiResponse<serde_json::Value> = response.json();
        let allocations = body.data["allocations"].as_array().unwrap();
        // Entry count is idempotent; amounts are additive
        assert_eq!(allocations.len(), 2);
        let first_entry = allocations
            .iter()
            .find(|a| a["economic_code"] == "3111101")
            .unwrap();
        assert_eq!(as_decimal(&first_entry["amount"]), Decimal::new(1500, 0));
    }

    #[tokio::test]
    async fn test_codewise_upsert_merges_duplicates_within_one_request() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let request = UpsertCodewiseBudgetRequest {
            upazila_id: 9,
            upazila_name: "Kaliganj".to_string(),
            allocations: vec![
                AllocationInput {
                    economic_code: "3111101".to_string(),
                    amount: Decimal::new(300, 0),
                },
                AllocationInput {
                    economic_code: "3111101".to_string(),
                    amount: Decimal::new(200, 0),
                },
            ],
        };

        let response = server.post("/api/v1/codewise-budgets").json(&request).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let allocations = body.data["allocations"].as_array().unwrap();
        assert_eq!(allocations.len(), 1);
        assert_eq!(as_decimal(&allocations[0]["amount"]), Decimal::new(500, 0));
    }

    #[tokio::test]
    async fn test_codewise_upsert_validation() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Empty allocation list
        let response = server
            .post("/api/v1/codewise-budgets")
            .json(&UpsertCodewiseBudgetRequest {
                upazila_id: 7,
                upazila_name: "Sadar".to_string(),
                allocations: vec![],
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Blank name
        let response = server
            .post("/api/v1/codewise-budgets")
            .json(&UpsertCodewiseBudgetRequest {
                upazila_id: 7,
                upazila_name: "  ".to_string(),
                allocations: vec![AllocationInput {
                    economic_code: "3111101".to_string(),
                    amount: Decimal::new(1, 0),
                }],
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Non-positive amount
        let response = server
            .post("/api/v1/codewise-budgets")
            .json(&UpsertCodewiseBudgetRequest {
                upazila_id: 7,
                upazila_name: "Sadar".to_string(),
                allocations: vec![AllocationInput {
                    economic_code: "3111101".to_string(),
                    amount: Decimal::ZERO,
                }],
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Nothing was created along the way
        server
            .get("/api/v1/codewise-budgets/7")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_codewise_budgets_listing() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        for upazila_id in [1, 2] {
            server
                .post("/api/v1/codewise-budgets")
                .json(&UpsertCodewiseBudgetRequest {
                    upazila_id,
                    upazila_name: format!("Upazila {}", upazila_id),
                    allocations: vec![AllocationInput {
                        economic_code: "3111101".to_string(),
                        amount: Decimal::new(100, 0),
                    }],
                })
                .await
                .assert_status(StatusCode::OK);
        }

        let response = server.get("/api/v1/codewise-budgets").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 2);
        assert!(body.data.iter().all(|ledger| {
            ledger["allocations"].as_array().map(|a| a.len()) == Some(1)
        }));
    }

    // --- Expenses ---

    #[tokio::test]
    async fn test_expense_deduction_against_distribution() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_economic_code(&server, "3111101", 1000).await;
        create_distribution(&server, "3111101", "uid-test-officer", 500)
            .await
            .assert_status(StatusCode::CREATED);

        // First expense fits
        let response = server
            .post("/api/v1/expenses")
            .json(&RecordExpenseRequest {
                uid: "uid-test-officer".to_string(),
                economic_code: "3111101".to_string(),
                expense_amount: Decimal::new(200, 0),
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(as_decimal(&body.data["expense_budget"]), Decimal::new(200, 0));

        // Second expense would exceed the remaining 300
        let response = server
            .post("/api/v1/expenses")
            .json(&RecordExpenseRequest {
                uid: "uid-test-officer".to_string(),
                economic_code: "3111101".to_string(),
                expense_amount: Decimal::new(400, 0),
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "EXPENSE_EXCEEDED");

        // Exactly the remaining amount is fine
        let response = server
            .post("/api/v1/expenses")
            .json(&RecordExpenseRequest {
                uid: "uid-test-officer".to_string(),
                economic_code: "3111101".to_string(),
                expense_amount: Decimal::new(300, 0),
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(as_decimal(&body.data["expense_budget"]), Decimal::new(500, 0));
    }

    #[tokio::test]
    async fn test_expense_without_distribution() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/expenses")
            .json(&RecordExpenseRequest {
                uid: "uid-test-officer".to_string(),
                economic_code: "3111101".to_string(),
                expense_amount: Decimal::new(10, 0),
            })
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "DISTRIBUTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_user_expenses() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        create_economic_code(&server, "3111101", 1000).await;
        create_economic_code(&server, "3211106", 1000).await;
        create_distribution(&server, "3111101", "uid-test-officer", 300)
            .await
            .assert_status(StatusCode::CREATED);
        create_distribution(&server, "3211106", "uid-test-officer", 150)
            .await
            .assert_status(StatusCode::CREATED);
        create_distribution(&server, "3111101", "uid-test-admin", 100)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/api/v1/users/uid-test-officer/expenses").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        // Only the officer's distributions are listed
        assert_eq!(body.data.len(), 2);
        assert!(body
            .data
            .iter()
            .all(|d| d["user_uid"] == "uid-test-officer"));
    }

    // --- Messages ---

    #[tokio::test]
    async fn test_message_log() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/messages")
            .json(&CreateMessageRequest {
                sender_uid: Some("uid-test-admin".to_string()),
                subject: Some("Quarterly release".to_string()),
                body: "Q3 allocations have been released.".to_string(),
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let message_id = body.data["id"].as_i64().unwrap();
        // Creation time is stamped server-side
        assert!(body.data["created_at"].is_string());

        // The message is retrievable by id
        let response = server.get(&format!("/api/v1/messages/{}", message_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["body"], "Q3 allocations have been released.");

        // And shows up in the listing
        let response = server.get("/api/v1/messages").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
    }

    #[tokio::test]
    async fn test_message_requires_body() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/messages")
            .json(&CreateMessageRequest {
                sender_uid: None,
                subject: None,
                body: "".to_string(),
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_message_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/messages/99999").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    // --- CSV import ---

    const CSV_HEADER: &str = "serial_code,upazila_id,user_uid,economic_code,distributed_budget";

    async fn distribution_count(server: &TestServer) -> usize {
        let response = server.get("/api/v1/budget-distributions").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        body.data.len()
    }

    #[tokio::test]
    async fn test_import_inserts_new_rows() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let csv = format!(
            "{}\nSER-1,1,uid-test-officer,3111101,500\nSER-2,1,uid-test-officer,3211106,200\nSER-3,2,uid-test-admin,3111101,100\n",
            CSV_HEADER
        );

        let response = server
            .post("/api/v1/imports/distributions")
            .text(csv)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["imported"], 3);
        assert_eq!(body.data["duplicates"], 0);
        assert_eq!(body.data["errors"].as_array().unwrap().len(), 0);
        assert_eq!(distribution_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_import_skips_seen_serial_codes() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let csv = format!(
            "{}\nSER-1,1,uid-test-officer,3111101,500\nSER-2,1,uid-test-officer,3211106,200\n",
            CSV_HEADER
        );
        server
            .post("/api/v1/imports/distributions")
            .text(csv.clone())
            .await
            .assert_status(StatusCode::OK);

        // Re-importing the same file inserts nothing and reports the count
        let response = server.post("/api/v1/imports/distributions").text(csv).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["imported"], 0);
        assert_eq!(body.data["duplicates"], 2);
        assert_eq!(distribution_count(&server).await, 2);

        // A mixed file inserts exactly the new rows
        let mixed = format!(
            "{}\nSER-2,1,uid-test-officer,3211106,200\nSER-4,2,uid-test-admin,3111101,75\n",
            CSV_HEADER
        );
        let response = server.post("/api/v1/imports/distributions").text(mixed).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["imported"], 1);
        assert_eq!(body.data["duplicates"], 1);
        assert_eq!(distribution_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_import_rejects_missing_header_column() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Header omits distributed_budget
        let csv = "serial_code,upazila_id,user_uid,economic_code\nSER-1,1,uid-test-officer,3111101\n";

        let response = server
            .post("/api/v1/imports/distributions")
            .text(csv)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_CSV_HEADER");
        // Nothing was inserted
        assert_eq!(distribution_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_import_reports_malformed_rows_individually() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let csv = format!(
            "{}\nSER-1,1,uid-test-officer,3111101,500\nSER-2,1,uid-test-officer,3211106,not-a-number\nSER-3,1,uid-test-officer,3311101,-5\n",
            CSV_HEADER
        );

        let response = server
            .post("/api/v1/imports/distributions")
            .text(csv)
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["imported"], 1);
        let errors = body.data["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        // Line numbers point at the offending rows (header is line 1)
        assert_eq!(errors[0]["line"], 3);
        assert_eq!(errors[1]["line"], 4);
        assert_eq!(distribution_count(&server).await, 1);
    }
}
