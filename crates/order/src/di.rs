use crate::{
    abstract_trait::order::{
        repository::{DynOrderQueryRepository, DynOrderStore},
        service::{DynOrderCommandService, DynOrderQueryService},
    },
    repository::{OrderQueryRepository, OrderStore},
    service::order::{
        OrderCommandService, OrderCommandServiceDeps, OrderQueryService, OrderQueryServiceDeps,
    },
};
use prometheus_client::registry::Registry;
use shared::config::{ConnectionPool, IsolationLevel};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_command: DynOrderCommandService,
    pub order_query: DynOrderQueryService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_command", &"OrderCommandService")
            .field("order_query", &"OrderQueryService")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub store: DynOrderStore,
    pub query: DynOrderQueryRepository,
}

impl DependenciesInjectDeps {
    pub fn postgres(pool: ConnectionPool, isolation: IsolationLevel) -> Self {
        Self {
            store: Arc::new(OrderStore::new(pool.clone(), isolation)),
            query: Arc::new(OrderQueryRepository::new(pool)),
        }
    }
}

impl DependenciesInject {
    pub async fn new(deps: DependenciesInjectDeps, registry: Arc<Mutex<Registry>>) -> Self {
        let DependenciesInjectDeps { store, query } = deps;

        let order_command: DynOrderCommandService = Arc::new(
            OrderCommandService::new(OrderCommandServiceDeps {
                store: store.clone(),
                registry: registry.clone(),
            })
            .await,
        );

        let order_query: DynOrderQueryService = Arc::new(
            OrderQueryService::new(OrderQueryServiceDeps {
                query,
                store,
                registry,
            })
            .await,
        );

        Self {
            order_command,
            order_query,
        }
    }
}
