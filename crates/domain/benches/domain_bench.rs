use common::{AggregateId, Currency, Money, Sku};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Aggregate, Confirm, CreateOrder, CustomerId, Order, OrderEvent, OrderService, RegisterItem,
    Reserve,
};
use domain::InventoryService;
use event_store::{AppendOptions, EventEnvelope, EventStore, InMemoryEventStore, Version};

fn make_envelope(aggregate_id: AggregateId, version: i64, event: &OrderEvent) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type("Order")
        .event_type(domain::DomainEvent::event_type(event))
        .version(Version::new(version))
        .payload(event)
        .unwrap()
        .build()
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let service = OrderService::new(store);
                let cmd = CreateOrder::for_customer(CustomerId::new());
                service.create_order(cmd).await.unwrap();
            });
        });
    });
}

fn bench_confirm_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_add_confirm", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let service = OrderService::new(store);
                let cmd = CreateOrder::for_customer(CustomerId::new());
                let order_id = cmd.order_id;
                service.create_order(cmd).await.unwrap();

                service
                    .add_item_to_order(order_id, "SKU-001", 2, Money::from_cents(1000))
                    .await
                    .unwrap();

                service.confirm_order(Confirm::new(order_id)).await.unwrap();
            });
        });
    });
}

fn bench_reserve_stock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let service = InventoryService::new(store);

    let cmd = RegisterItem::new("SKU-BENCH", "WH-1", 1_000_000, 10);
    let item_id = cmd.item_id;
    rt.block_on(async { service.register_item(cmd).await.unwrap() });

    c.bench_function("domain/reserve_stock", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .reserve(Reserve::new(item_id, AggregateId::new(), 1))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_aggregate_reconstruction(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let agg_id = AggregateId::new();
    let customer_id = CustomerId::new();

    // Pre-populate: 1 create + 50 add-item events
    rt.block_on(async {
        let created = OrderEvent::created(agg_id, customer_id, Currency::Usd);
        let mut events = vec![make_envelope(agg_id, 1, &created)];
        for v in 2..=51 {
            let added = OrderEvent::item_added(
                Sku::new(format!("SKU-{v:03}")),
                1,
                Money::from_cents(100 * v),
            );
            events.push(make_envelope(agg_id, v, &added));
        }
        store.append(events, AppendOptions::new()).await.unwrap();
    });

    c.bench_function("domain/reconstruct_50_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                let events = store.get_events_for_aggregate(agg_id).await.unwrap();
                let mut order = Order::default();
                for event in &events {
                    let domain_event: OrderEvent =
                        serde_json::from_value(event.payload.clone()).unwrap();
                    order.apply(domain_event);
                }
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_confirm_cycle,
    bench_reserve_stock,
    bench_aggregate_reconstruction
);
criterion_main!(benches);
