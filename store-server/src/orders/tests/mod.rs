use super::*;
use crate::db::init_schema;
use crate::db::models::{
    AccountStanding, Agent, AgentCreate, DeliveryType, Order, OrderCreate, OrderStatus,
    WorkCapacity,
};
use crate::db::repository::{AgentRepository, OrderRepository};
use surrealdb::engine::local::{Db, Mem};
use surrealdb::{RecordId, Surreal};

async fn test_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    init_schema(&db).await.unwrap();
    db
}

/// 创建 own-delivery 待处理订单
async fn create_own_order(db: &Surreal<Db>) -> Order {
    create_order(db, DeliveryType::Own).await
}

async fn create_order(db: &Surreal<Db>, delivery_type: DeliveryType) -> Order {
    OrderRepository::new(db.clone())
        .create(OrderCreate {
            delivery_type,
            total: 499.0,
            urgent: false,
            customer_name: Some("Asha".to_string()),
            customer_phone: Some("9876500001".to_string()),
            created_by: Some("admin1".to_string()),
        })
        .await
        .unwrap()
}

/// 创建已审批且激活的配送员
async fn create_approved_agent(db: &Surreal<Db>, name: &str, phone: &str) -> Agent {
    let repo = AgentRepository::new(db.clone());
    let agent = repo
        .create(AgentCreate {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
        })
        .await
        .unwrap();
    repo.set_standing(&key(&agent.id), AccountStanding::Active, true)
        .await
        .unwrap()
}

/// 取出文档的 "table:key" 字符串
fn key(id: &Option<RecordId>) -> String {
    id.as_ref().unwrap().to_string()
}

async fn reload_order(db: &Surreal<Db>, order: &Order) -> Order {
    OrderRepository::new(db.clone())
        .find_by_id(&key(&order.id))
        .await
        .unwrap()
        .unwrap()
}

async fn reload_agent(db: &Surreal<Db>, agent: &Agent) -> Agent {
    AgentRepository::new(db.clone())
        .find_by_id(&key(&agent.id))
        .await
        .unwrap()
        .unwrap()
}

mod test_assignment;
mod test_bulk;
mod test_earnings;
