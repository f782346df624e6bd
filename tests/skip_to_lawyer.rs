//! End-to-end tests for the skip-to-lawyer middleware and pipeline, using
//! in-memory fakes for the organization store and the lawyer directory.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use lexintake::{
    ChatMessage, ContextPatch, ConversationContext, ConversationPhase, IntakeConfig,
    LawyerProfile, LawyerSearch, LawyerSearchError, MiddlewareAction, MiddlewareDecision,
    Organization, Pipeline, PipelineOutcome, PipelineServices, SearchResult,
    SkipToLawyerMiddleware, StaticOrganizationStore, Urgency,
};

/// Directory fake that replays a canned outcome and counts calls.
struct FakeDirectory {
    outcome: Box<dyn Fn() -> Result<SearchResult, LawyerSearchError> + Send + Sync>,
}

impl FakeDirectory {
    fn ok(result: SearchResult) -> Self {
        Self {
            outcome: Box::new(move || Ok(result.clone())),
        }
    }

    fn quota(message: &str) -> Self {
        let message = message.to_string();
        Self {
            outcome: Box::new(move || Err(LawyerSearchError::QuotaExceeded(message.clone()))),
        }
    }

    fn timeout(message: &str) -> Self {
        let message = message.to_string();
        Self {
            outcome: Box::new(move || Err(LawyerSearchError::Timeout(message.clone()))),
        }
    }
}

#[async_trait]
impl LawyerSearch for FakeDirectory {
    async fn search(
        &self,
        _matter_type: &str,
        _location: Option<&str>,
    ) -> Result<SearchResult, LawyerSearchError> {
        (self.outcome)()
    }
}

fn profile(name: &str) -> LawyerProfile {
    LawyerProfile {
        name: name.to_string(),
        firm: Some(format!("{name} & Partners")),
        location: Some("Springfield, IL".to_string()),
        phone: Some("(555) 123-4567".to_string()),
        email: None,
        rating: None,
    }
}

fn services(directory: FakeDirectory, store: StaticOrganizationStore) -> PipelineServices {
    PipelineServices {
        config: Arc::new(IntakeConfig::resolve().expect("intake config")),
        organizations: Arc::new(store),
        lawyer_search: Arc::new(directory),
    }
}

fn middleware(services: &PipelineServices) -> SkipToLawyerMiddleware {
    SkipToLawyerMiddleware::new(&services.config).expect("middleware builds")
}

fn public_context() -> ConversationContext {
    ConversationContext::new(Uuid::new_v4(), None)
}

fn org_context(org_id: &str) -> ConversationContext {
    ConversationContext::new(Uuid::new_v4(), Some(org_id.to_string()))
}

async fn run(
    services: &PipelineServices,
    messages: &[ChatMessage],
    context: ConversationContext,
) -> MiddlewareDecision {
    use lexintake::Middleware;
    middleware(services)
        .handle(messages, &context, services)
        .await
        .expect("middleware never errors in these scenarios")
}

#[tokio::test]
async fn skip_request_in_short_conversation_triggers() {
    let services = services(
        FakeDirectory::ok(SearchResult::default()),
        StaticOrganizationStore::new(),
    );
    let messages = [ChatMessage::user("please skip the intake")];

    let decision = run(&services, &messages, public_context()).await;
    assert!(matches!(decision, MiddlewareDecision::Respond(_)));
}

#[tokio::test]
async fn skip_phrase_only_in_earlier_turn_abstains() {
    let services = services(
        FakeDirectory::ok(SearchResult::default()),
        StaticOrganizationStore::new(),
    );
    let messages = [
        ChatMessage::user("I think I need a lawyer for this"),
        ChatMessage::assistant("Tell me more about what happened."),
        ChatMessage::user("It started with a dispute over my lease"),
    ];

    let decision = run(&services, &messages, public_context()).await;
    assert_eq!(decision, MiddlewareDecision::Abstain);
}

#[tokio::test]
async fn established_long_conversation_suppresses_plain_skip_requests() {
    let services = services(
        FakeDirectory::ok(SearchResult::default()),
        StaticOrganizationStore::new(),
    );
    let context = public_context().apply(ContextPatch {
        add_established_matter: Some("family law".to_string()),
        ..Default::default()
    });
    let messages = [
        ChatMessage::user("I'm going through a divorce"),
        ChatMessage::assistant("I'm sorry to hear that. When did this start?"),
        ChatMessage::user("Last month"),
        ChatMessage::assistant("Do you share any property?"),
        ChatMessage::user("Maybe I should just find a lawyer"),
    ];

    let decision = run(&services, &messages, context).await;
    assert_eq!(decision, MiddlewareDecision::Abstain);
}

#[tokio::test]
async fn urgent_request_overrides_established_context_suppression() {
    let services = services(
        FakeDirectory::ok(SearchResult::default()),
        StaticOrganizationStore::new(),
    );
    let context = public_context().apply(ContextPatch {
        add_established_matter: Some("family law".to_string()),
        ..Default::default()
    });
    let messages = [
        ChatMessage::user("I'm going through a divorce"),
        ChatMessage::assistant("I'm sorry to hear that. When did this start?"),
        ChatMessage::user("Last month"),
        ChatMessage::assistant("Do you share any property?"),
        ChatMessage::user("Actually I need a lawyer asap"),
    ];

    let decision = run(&services, &messages, context).await;
    assert!(matches!(decision, MiddlewareDecision::Respond(_)));
}

#[tokio::test]
async fn quota_error_terminates_with_fallback_and_unchanged_context() {
    let services = services(FakeDirectory::quota("no quota"), StaticOrganizationStore::new());
    let context = public_context();
    let messages = [ChatMessage::user("find me a lawyer for a family law issue")];

    let decision = run(&services, &messages, context.clone()).await;
    let MiddlewareDecision::Respond(result) = decision else {
        panic!("expected a terminal response");
    };

    assert!(result.should_stop);
    assert!(result.response.contains("no quota"));
    assert_eq!(result.context, context);
    let Some(MiddlewareAction::QuotaExceededFallback { alternatives }) = result.metadata else {
        panic!("expected quota fallback metadata");
    };
    assert_eq!(
        alternatives,
        vec![
            "bar_association".to_string(),
            "online_directories".to_string(),
            "case_preparation".to_string(),
        ]
    );
}

#[tokio::test]
async fn timeout_error_uses_its_message_in_the_fallback() {
    let services = services(
        FakeDirectory::timeout("lawyer search timed out after 10s"),
        StaticOrganizationStore::new(),
    );
    let messages = [ChatMessage::user("find me a lawyer")];

    let decision = run(&services, &messages, public_context()).await;
    let MiddlewareDecision::Respond(result) = decision else {
        panic!("expected a terminal response");
    };
    assert!(result.should_stop);
    assert!(result.response.contains("timed out"));
}

#[tokio::test]
async fn successful_search_lists_at_most_three_and_caches_full_results() {
    let result = SearchResult {
        lawyers: vec![profile("Ada"), profile("Ben"), profile("Cy"), profile("Dee")],
        total: 5,
    };
    let services = services(FakeDirectory::ok(result), StaticOrganizationStore::new());
    let messages = [ChatMessage::user(
        "skip the intake, I need help with a personal injury claim in Texas",
    )];

    let decision = run(&services, &messages, public_context()).await;
    let MiddlewareDecision::Respond(result) = decision else {
        panic!("expected a terminal response");
    };

    assert!(result.should_stop);
    assert!(result.response.contains('5'));
    assert!(result.response.contains("Cy"));
    assert!(!result.response.contains("Dee"));
    assert_eq!(
        result.metadata,
        Some(MiddlewareAction::LawyerSearchSuccess { total: 5, shown: 3 })
    );

    let cached = result
        .context
        .lawyer_search_results
        .expect("results cached on context");
    assert_eq!(cached.total, 5);
    assert_eq!(cached.lawyers.len(), 4);
    assert_eq!(cached.matter_type, "personal injury");
    // Location was mentioned, so no clarifying flag.
    assert!(!result.context.safety_flags.contains("location_required"));
}

#[tokio::test]
async fn search_without_location_mention_sets_location_required_flag() {
    let services = services(
        FakeDirectory::ok(SearchResult::default()),
        StaticOrganizationStore::new(),
    );
    let messages = [ChatMessage::user("skip the intake, I want a lawyer")];

    let decision = run(&services, &messages, public_context()).await;
    let MiddlewareDecision::Respond(result) = decision else {
        panic!("expected a terminal response");
    };
    assert!(result.context.safety_flags.contains("location_required"));
}

#[tokio::test]
async fn organization_mode_requests_contact_form_without_stopping() {
    let store = StaticOrganizationStore::new().with_organization(Organization {
        id: "org-42".to_string(),
        slug: "acme-law".to_string(),
        name: "Acme Law".to_string(),
    });
    let services = services(FakeDirectory::ok(SearchResult::default()), store);
    let messages = [ChatMessage::user(
        "contact your organization about my family law divorce, it's urgent",
    )];

    let decision = run(&services, &messages, org_context("org-42")).await;
    let MiddlewareDecision::Respond(result) = decision else {
        panic!("expected a contact-form response");
    };

    assert!(!result.should_stop);
    assert_eq!(result.response, "");
    assert_eq!(result.context.conversation_phase, ConversationPhase::ContactCollection);
    assert_eq!(result.context.user_intent.as_deref(), Some("lawyer_contact"));
    assert!(result.context.established_matters.contains(&"family law".to_string()));

    let form = result.context.pending_contact_form.expect("pending form set");
    assert_eq!(form.matter_type, "family law");
    assert_eq!(form.urgency, Urgency::High);
}

#[tokio::test]
async fn public_marker_organization_routes_to_lawyer_search() {
    let store = StaticOrganizationStore::new().with_organization(Organization {
        id: "org-pub".to_string(),
        slug: "public".to_string(),
        name: "Public Intake".to_string(),
    });
    let services = services(
        FakeDirectory::ok(SearchResult {
            lawyers: vec![profile("Ada")],
            total: 1,
        }),
        store,
    );
    let messages = [ChatMessage::user("find me a lawyer")];

    let decision = run(&services, &messages, org_context("org-pub")).await;
    let MiddlewareDecision::Respond(result) = decision else {
        panic!("expected a terminal response");
    };
    assert!(result.should_stop);
    assert!(result.context.lawyer_search_results.is_some());
}

#[tokio::test]
async fn retried_contact_form_trigger_does_not_duplicate_matters() {
    let store = StaticOrganizationStore::new().with_organization(Organization {
        id: "org-42".to_string(),
        slug: "acme-law".to_string(),
        name: "Acme Law".to_string(),
    });
    let services = services(FakeDirectory::ok(SearchResult::default()), store);
    let messages = [ChatMessage::user("contact your organization, family law issue, urgent")];

    let first = run(&services, &messages, org_context("org-42")).await;
    let MiddlewareDecision::Respond(first) = first else {
        panic!("expected first trigger");
    };

    // Same latest message replayed against the already-triggered context.
    let second = run(&services, &messages, first.context.clone()).await;
    let MiddlewareDecision::Respond(second) = second else {
        panic!("expected second trigger");
    };

    let matters: Vec<&String> = second
        .context
        .established_matters
        .iter()
        .filter(|m| m.as_str() == "family law")
        .collect();
    assert_eq!(matters.len(), 1, "matter must not be double-appended");
}

#[tokio::test]
async fn empty_message_list_and_blank_latest_turn_abstain() {
    let services = services(
        FakeDirectory::ok(SearchResult::default()),
        StaticOrganizationStore::new(),
    );

    let decision = run(&services, &[], public_context()).await;
    assert_eq!(decision, MiddlewareDecision::Abstain);

    let blank = [ChatMessage::user("   ")];
    let decision = run(&services, &blank, public_context()).await;
    assert_eq!(decision, MiddlewareDecision::Abstain);
}

#[tokio::test]
async fn full_pipeline_returns_terminal_result_on_search_success() {
    lexintake::telemetry::init();
    let services = services(
        FakeDirectory::ok(SearchResult {
            lawyers: vec![profile("Ada")],
            total: 1,
        }),
        StaticOrganizationStore::new(),
    );
    let pipeline = Pipeline::new().with_middleware(Arc::new(middleware(&services)));
    let messages = [ChatMessage::user("skip the intake")];

    let outcome = pipeline.run(&messages, public_context(), &services).await;
    let PipelineOutcome::Terminal(result) = outcome else {
        panic!("expected terminal outcome");
    };
    assert!(result.should_stop);
    assert!(result.response.contains("Ada"));
}

#[tokio::test]
async fn full_pipeline_continues_with_mutated_context_in_organization_mode() {
    let store = StaticOrganizationStore::new().with_organization(Organization {
        id: "org-42".to_string(),
        slug: "acme-law".to_string(),
        name: "Acme Law".to_string(),
    });
    let services = services(FakeDirectory::ok(SearchResult::default()), store);
    let pipeline = Pipeline::new().with_middleware(Arc::new(middleware(&services)));
    let messages = [ChatMessage::user("contact your organization please")];

    let outcome = pipeline.run(&messages, org_context("org-42"), &services).await;
    let PipelineOutcome::Continue(context) = outcome else {
        panic!("expected continuation to the downstream agent");
    };
    assert!(context.pending_contact_form.is_some());
    assert_eq!(context.conversation_phase, ConversationPhase::ContactCollection);
}
