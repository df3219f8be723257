//! # Service Container
//!
//! Holds every pipeline component and wires them onto one event bus.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Event bus, clock, stores (no dependencies)
//! Level 1: Renderer, Validator, Error Classifier
//! Level 2: Signature Engine (strategies from config), Transport
//! Level 3: Status Tracker (repository, transport, classifier, bus)
//! Level 4: Confirmation Validator (receipt store, verifier)
//! ```

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
use shared_types::SignatureType;
use tf_01_renderer::RendererService;
use tf_02_validator::ValidatorService;
use tf_03_signature::adapters::identity_http::DEFAULT_IDENTITY_TIMEOUT;
use tf_03_signature::{
    HttpIdentityProvider, IdentityProviderError, InMemorySignatureRecordStore,
    LocalCertificateStrategy, SignatureEngine, SignatureError, SignatureStrategy, StrategyConfig,
    TrustedIdentityStrategy, UnsignedStrategy,
};
use tf_04_transport::{
    FilingTransport, HttpSoapChannel, SoapTransportClient, TransportConfig, TransportCredentials,
    TransportError,
};
use tf_05_error_classifier::ErrorClassifier;
use tf_06_status_tracker::{Clock, DeclarationRepository, InMemoryDeclarationRepository, StatusTracker, SystemClock};
use tf_07_confirmation::{
    ConfirmationError, ConfirmationStore, ConfirmationValidator, InMemoryConfirmationStore,
    ReceiptSignatureVerifier, RsaReceiptVerifier,
};

use crate::adapters::MeteredTransport;
use crate::container::config::{ConfigError, FilingConfig};
use crate::handlers::{ConfirmationHandler, MetricsHandler};
use crate::ports::TotalsSource;
use crate::wiring::{FilingPipeline, PollScheduler};

/// Errors raised while assembling the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("signing setup failed: {0}")]
    Signature(#[from] SignatureError),

    #[error("identity provider setup failed: {0}")]
    Identity(#[from] IdentityProviderError),

    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("receipt verifier setup failed: {0}")]
    Receipt(#[from] ConfirmationError),
}

/// Central container holding all component instances.
pub struct FilingContainer {
    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Event bus every component publishes to.
    pub event_bus: Arc<InMemoryEventBus>,
    pub clock: Arc<dyn Clock>,
    pub repository: Arc<dyn DeclarationRepository>,
    pub confirmation_store: Arc<dyn ConfirmationStore>,

    // =========================================================================
    // COMPONENTS
    // =========================================================================
    pub renderer: Arc<RendererService>,
    pub validator: Arc<ValidatorService>,
    pub signer: Arc<SignatureEngine>,
    pub transport: Arc<dyn FilingTransport>,
    pub classifier: Arc<ErrorClassifier>,
    pub tracker: Arc<StatusTracker>,
    pub confirmations: Arc<ConfirmationValidator>,

    /// Configuration (immutable after initialization).
    pub config: FilingConfig,
}

impl FilingContainer {
    /// Build every component from configuration, loading keys and
    /// certificates from disk.
    #[instrument(name = "container_init", skip(config))]
    pub fn from_config(config: FilingConfig) -> Result<Self, ContainerError> {
        if config.environment.is_production() {
            config.validate_for_production()?;
        } else {
            config.validate()?;
        }

        let strategies = Self::load_strategies(&config)?;

        // Level 2: transport with the client WS-Security identity
        let transport_config = TransportConfig {
            endpoint: config.authority.endpoint.clone(),
            timeout: config.authority.timeout,
            soap_action_prefix: config.authority.soap_action_prefix.clone(),
        };
        let client_key = read_text(config.client_key_path().ok_or(ConfigError::Missing("TF_CLIENT_KEY_PATH"))?)?;
        let client_cert = read_bytes(
            config
                .client_certificate_path()
                .ok_or(ConfigError::Missing("TF_CLIENT_CERT_PATH"))?,
        )?;
        let credentials = TransportCredentials::from_pem(&client_key, &client_cert)?;
        let channel = HttpSoapChannel::new(&transport_config)?;
        let transport: Arc<dyn FilingTransport> = Arc::new(MeteredTransport::new(
            SoapTransportClient::new(channel, credentials, transport_config),
        ));

        let verifier: Option<Arc<dyn ReceiptSignatureVerifier>> =
            match &config.authority.receipt_public_key_path {
                Some(path) => {
                    let pem = read_text(path)?;
                    Some(Arc::new(RsaReceiptVerifier::from_public_key_pem(&pem)?))
                }
                None => None,
            };

        Ok(Self::assemble(
            config,
            transport,
            strategies,
            verifier,
            Arc::new(SystemClock),
        ))
    }

    /// Wire the components around an already built transport, strategy set
    /// and clock. Used by `from_config` and by tests with scripted adapters.
    pub fn assemble(
        config: FilingConfig,
        transport: Arc<dyn FilingTransport>,
        strategies: Vec<Arc<dyn SignatureStrategy>>,
        verifier: Option<Arc<dyn ReceiptSignatureVerifier>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            environment = ?config.environment,
            endpoint = %config.authority.endpoint,
            "Initializing filing container"
        );

        // Level 0
        let event_bus = Arc::new(InMemoryEventBus::new());
        let repository: Arc<dyn DeclarationRepository> = Arc::new(InMemoryDeclarationRepository::new());
        let confirmation_store: Arc<dyn ConfirmationStore> = Arc::new(InMemoryConfirmationStore::new());

        // Level 1
        let renderer = Arc::new(RendererService::new());
        let validator = Arc::new(ValidatorService::new(config.validation.document));
        let classifier = Arc::new(ErrorClassifier::new(Arc::new(config.retry.clone())));

        // Level 2
        let mut signer = SignatureEngine::new(
            Arc::new(InMemorySignatureRecordStore::new()),
            config.environment.is_production(),
        );
        for strategy in strategies {
            info!(signature_type = %strategy.describe().signature_type, "Signature strategy registered");
            signer = signer.with_strategy(strategy);
        }
        let signer = Arc::new(signer);

        // Level 3
        let tracker = Arc::new(StatusTracker::new(
            Arc::clone(&repository),
            Arc::clone(&transport),
            classifier.clone(),
            event_bus.clone(),
            Arc::clone(&clock),
            config.scheduler.tracker_config(),
        ));

        // Level 4
        let mut confirmations =
            ConfirmationValidator::new(Arc::clone(&confirmation_store), config.validation.receipt);
        match verifier {
            Some(verifier) => confirmations = confirmations.with_verifier(verifier),
            None => info!("No receipt verification key configured; receipt signatures are not checked"),
        }

        info!("All filing components initialized");

        Self {
            event_bus,
            clock,
            repository,
            confirmation_store,
            renderer,
            validator,
            signer,
            transport,
            classifier,
            tracker,
            confirmations: Arc::new(confirmations),
            config,
        }
    }

    fn load_strategies(config: &FilingConfig) -> Result<Vec<Arc<dyn SignatureStrategy>>, ContainerError> {
        let signing = &config.signing;
        let mut strategies: Vec<Arc<dyn SignatureStrategy>> = vec![Arc::new(UnsignedStrategy)];

        if let (Some(key_path), Some(cert_path)) = (&signing.key_path, &signing.certificate_path) {
            let key = read_text(key_path)?;
            let certificate = read_bytes(cert_path)?;
            let strategy = LocalCertificateStrategy::from_pem(&key, &certificate, signing.trust_policy())?;
            info!(
                subject = %strategy.certificate_info().subject,
                serial = %strategy.certificate_info().serial,
                "Loaded signing certificate"
            );
            strategies.push(Arc::new(strategy));
        }

        if let Some(url) = &signing.identity_provider_url {
            let mut provider = HttpIdentityProvider::new(url.clone(), DEFAULT_IDENTITY_TIMEOUT)?;
            if let Some(token) = &signing.identity_provider_token {
                provider = provider.with_token(token.clone());
            }
            strategies.push(Arc::new(TrustedIdentityStrategy::new(Arc::new(provider))));
        }

        Ok(strategies)
    }

    /// Strategy settings every new filing is signed with.
    pub fn signature_config(&self) -> StrategyConfig {
        let signing = &self.config.signing;
        match signing.signature_type {
            SignatureType::TrustedIdentity => StrategyConfig {
                signature_type: SignatureType::TrustedIdentity,
                signer_reference: signing.signer_reference.clone(),
            },
            other => StrategyConfig::new(other),
        }
    }

    pub fn pipeline(&self, totals: Arc<dyn TotalsSource>) -> FilingPipeline {
        FilingPipeline::new(
            totals,
            self.renderer.clone(),
            self.validator.clone(),
            self.signer.clone(),
            self.tracker.clone(),
            self.event_bus.clone(),
        )
    }

    pub fn scheduler(&self) -> PollScheduler {
        PollScheduler::new(
            self.tracker.clone(),
            Arc::clone(&self.repository),
            Arc::clone(&self.clock),
            self.config.scheduler.sweep_interval,
        )
    }

    /// Handler plus its subscription. Subscribe before anything publishes.
    pub fn confirmation_handler(&self) -> (ConfirmationHandler, shared_bus::Subscription) {
        let subscription = self
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Lifecycle]));
        let handler = ConfirmationHandler::new(
            self.tracker.clone(),
            Arc::clone(&self.transport),
            self.confirmations.clone(),
            self.event_bus.clone(),
        );
        (handler, subscription)
    }

    pub fn metrics_handler(&self) -> (MetricsHandler, shared_bus::Subscription) {
        let subscription = self.event_bus.subscribe(EventFilter::all());
        (MetricsHandler::new(), subscription)
    }
}

fn read_text(path: &Path) -> Result<String, ContainerError> {
    std::fs::read_to_string(path).map_err(|source| ContainerError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ContainerError> {
    std::fs::read(path).map_err(|source| ContainerError::Io {
        path: path.display().to_string(),
        source,
    })
}
