//! Scenario tests for the order lifecycle, daily reset and view synchronization.
//! These tests run against an in-memory SQLite shared store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeZone};

    use crate::activity::{log_activity, recent_activity};
    use crate::clock::{Clock, ManualClock};
    use crate::daily_reset::{check_daily_reset, next_order_id, DailyResetTimer, ResetOutcome};
    use crate::db::Database;
    use crate::error::AppError;
    use crate::forms::{BroadcastForm, CategoryForm, CheckoutForm, FormError, MenuItemForm, TotalForm};
    use crate::models::{Order, OrderLine, OrderStatus};
    use crate::notifications::{check_order_notifications, track_order_for_notification};
    use crate::orders::{display_order, OrderBook};
    use crate::store::{SessionStore, SharedStore, StoreKey};
    use crate::views::{CustomerReaction, CustomerView, SessionCheck, StaffDashboard, StaffReaction};

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, day, hour, minute, 0)
            .unwrap()
    }

    /// Create a shared store over a fresh in-memory database
    fn setup_store() -> Arc<SharedStore> {
        let db = Database::open_in_memory().expect("Failed to create in-memory database");
        db.initialize().expect("Failed to create schema");
        Arc::new(SharedStore::new(Arc::new(db)))
    }

    fn setup() -> (Arc<SharedStore>, Arc<ManualClock>) {
        (setup_store(), Arc::new(ManualClock::new(at(18, 9, 0))))
    }

    fn dyn_clock(clock: &Arc<ManualClock>) -> Arc<dyn Clock> {
        clock.clone()
    }

    fn checkout(time: &str) -> CheckoutForm {
        CheckoutForm {
            pickup_time: time.to_string(),
        }
    }

    fn line(id: &str, name: &str, price: f64, qty: u32) -> OrderLine {
        OrderLine {
            id: id.to_string(),
            name: name.to_string(),
            price,
            qty,
            note: String::new(),
        }
    }

    fn order(id: &str, status: OrderStatus, pickup: Option<&str>, date: DateTime<Local>) -> Order {
        Order {
            id: id.to_string(),
            customer: "Invité".to_string(),
            date: date.with_timezone(&chrono::Utc),
            pickup_time: pickup.map(str::to_string),
            items: vec![line("espresso", "Espresso / Allongé", 2.5, 1)],
            total: 2.5,
            status,
        }
    }

    fn submit_one(view: &mut CustomerView, item: &str, time: &str) -> Order {
        assert!(view.add_to_cart(item).unwrap());
        view.submit(&checkout(time)).unwrap()
    }

    // ===== STORE TESTS =====

    #[test]
    fn test_absent_keys_use_defaults() {
        let store = setup_store();

        assert!(store.orders().unwrap().is_empty());
        assert!(store.menu().unwrap().is_none());
        assert_eq!(store.broadcast().unwrap(), None);
        assert!(!store.service_paused().unwrap());
        assert_eq!(store.order_counter().unwrap(), 0);
        assert!(store.activity_log().unwrap().is_empty());
        assert!(store.visit_stats().unwrap().is_empty());
        assert!(!store.staff_session().unwrap());
    }

    #[test]
    fn test_malformed_value_reads_as_absent() {
        let store = setup_store();
        store.write_raw(StoreKey::Orders, "{not json").unwrap();
        store.write_raw(StoreKey::OrderCounter, "abc").unwrap();

        assert!(store.orders().unwrap().is_empty());
        assert_eq!(store.order_counter().unwrap(), 0);
    }

    #[test]
    fn test_unchanged_write_raises_no_notification() {
        let store = setup_store();
        let mut changes = store.subscribe();

        store.set_service_paused(false).unwrap();
        store.set_service_paused(false).unwrap();
        store.clear_broadcast().unwrap();

        let seen = changes.drain();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].key, StoreKey::ServicePaused);
        assert_eq!(seen[0].new_value.as_deref(), Some("false"));
    }

    #[test]
    fn test_keyed_subscription_filters() {
        let store = setup_store();
        let mut orders_only = store.subscribe_keys(&[StoreKey::Orders]);

        store.set_broadcast("Fermeture à 18h").unwrap();
        store.set_orders(&[]).unwrap();

        let seen = orders_only.drain();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].key, StoreKey::Orders);
    }

    #[test]
    fn test_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cafe.db");

        {
            let db = Database::open(&path).unwrap();
            db.initialize().unwrap();
            let store = SharedStore::new(Arc::new(db));
            store.set_broadcast("Cookies tout chauds").unwrap();
            store.set_order_counter(7).unwrap();
        }

        let db = Database::open(&path).unwrap();
        db.initialize().unwrap();
        let store = SharedStore::new(Arc::new(db));
        assert_eq!(store.broadcast().unwrap().as_deref(), Some("Cookies tout chauds"));
        assert_eq!(store.order_counter().unwrap(), 7);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
    }

    // ===== ORDER ID TESTS =====

    #[test]
    fn test_order_ids_run_one_to_n_within_a_day() {
        let (store, clock) = setup();

        let ids: Vec<String> = (0..5)
            .map(|_| next_order_id(&store, clock.as_ref()).unwrap())
            .collect();
        assert_eq!(ids, vec!["#1", "#2", "#3", "#4", "#5"]);
    }

    #[test]
    fn test_first_order_id_of_new_day_is_one() {
        let (store, clock) = setup();
        next_order_id(&store, clock.as_ref()).unwrap();
        next_order_id(&store, clock.as_ref()).unwrap();

        clock.set(at(19, 7, 30));
        assert_eq!(next_order_id(&store, clock.as_ref()).unwrap(), "#1");
        assert_eq!(store.last_order_date().unwrap().as_deref(), Some("19/10/2026"));
    }

    #[test]
    fn test_first_order_without_recorded_date_is_one() {
        let (store, clock) = setup();
        store.set_order_counter(4).unwrap();

        assert_eq!(next_order_id(&store, clock.as_ref()).unwrap(), "#1");
        assert_eq!(next_order_id(&store, clock.as_ref()).unwrap(), "#2");
    }

    // ===== DAILY RESET TESTS =====

    #[test]
    fn test_first_run_records_date_without_wipe() {
        let (store, clock) = setup();
        store.set_order_counter(4).unwrap();

        let outcome = check_daily_reset(&store, clock.as_ref()).unwrap();
        assert_eq!(outcome, ResetOutcome::FirstRun);
        assert_eq!(store.order_counter().unwrap(), 4);
        assert_eq!(store.last_order_date().unwrap().as_deref(), Some("18/10/2026"));
    }

    #[test]
    fn test_daily_reset_is_idempotent() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        book.create_manual_order().unwrap();

        clock.set(at(19, 0, 1));
        let first = check_daily_reset(&store, clock.as_ref()).unwrap();
        assert_eq!(
            first,
            ResetOutcome::Wiped {
                previous_day: "18/10/2026".to_string()
            }
        );

        book.create_manual_order().unwrap();
        let second = check_daily_reset(&store, clock.as_ref()).unwrap();
        assert_eq!(second, ResetOutcome::Unchanged);
        assert_eq!(store.orders().unwrap().len(), 1);
    }

    #[test]
    fn test_daily_reset_wipes_orders_log_and_counter() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        let first = book.create_manual_order().unwrap();
        book.create_manual_order().unwrap();
        book.set_status(&first.id, OrderStatus::Ready).unwrap();
        assert_eq!(store.activity_log().unwrap().len(), 1);

        store.set_last_order_date("17/10/2026").unwrap();
        check_daily_reset(&store, clock.as_ref()).unwrap();

        assert!(store.orders().unwrap().is_empty());
        assert!(store.activity_log().unwrap().is_empty());
        assert_eq!(store.raw(StoreKey::OrderCounter).unwrap().as_deref(), Some("0"));
        assert_eq!(next_order_id(&store, clock.as_ref()).unwrap(), "#1");
    }

    #[test]
    fn test_daily_reset_keeps_menu_and_visits() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        let mut staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        staff.load().unwrap();
        staff
            .add_category(&CategoryForm {
                label: "Pâtisseries".to_string(),
            })
            .unwrap();

        clock.set(at(19, 8, 0));
        check_daily_reset(&store, clock.as_ref()).unwrap();

        assert!(store.menu().unwrap().is_some());
        assert!(store.visit_stats().unwrap().contains_key("18/10/2026"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_timer_wipes_after_midnight() {
        let store = setup_store();
        let clock = Arc::new(ManualClock::new(at(18, 23, 59)));
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        book.create_manual_order().unwrap();

        let timer = DailyResetTimer::start(store.clone(), dyn_clock(&clock), Duration::from_secs(60));
        assert!(timer.is_running());

        clock.advance(chrono::Duration::minutes(2));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(store.orders().unwrap().is_empty());
        assert_eq!(store.last_order_date().unwrap().as_deref(), Some("19/10/2026"));

        timer.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_no_longer_resets() {
        let store = setup_store();
        let clock = Arc::new(ManualClock::new(at(18, 23, 59)));
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        book.create_manual_order().unwrap();

        let timer = DailyResetTimer::start(store.clone(), dyn_clock(&clock), Duration::from_secs(60));
        timer.stop().await;

        clock.advance(chrono::Duration::minutes(2));
        tokio::time::sleep(Duration::from_secs(180)).await;

        assert_eq!(store.orders().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_timer_keeps_running() {
        let store = setup_store();
        let clock = Arc::new(ManualClock::new(at(18, 23, 59)));
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        book.create_manual_order().unwrap();

        let timer = DailyResetTimer::start(store.clone(), dyn_clock(&clock), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(timer.is_running());

        clock.advance(chrono::Duration::minutes(2));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(store.orders().unwrap().is_empty());

        timer.stop().await;
    }

    // ===== ORDER LIFECYCLE TESTS =====

    #[test]
    fn test_guest_checkout_scenario() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();

        assert!(customer.add_to_cart("espresso").unwrap());
        assert!(customer.add_to_cart("espresso").unwrap());
        let order = customer.submit(&checkout("10:15")).unwrap();

        assert_eq!(order.id, "#1");
        assert_eq!(order.customer, "Invité");
        assert!((order.total - 5.0).abs() < 0.001);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.pickup_time.as_deref(), Some("10:15"));
        assert_eq!(order.items, vec![line("espresso", "Espresso / Allongé", 2.5, 2)]);

        // Cart cleared and order tracked for this window
        assert!(customer.cart().is_empty());
        assert_eq!(customer.tracked_orders().unwrap(), vec!["#1".to_string()]);

        let raw = store.raw(StoreKey::Orders).unwrap().unwrap();
        assert!(raw.contains("\"status\":\"En attente\""));
        assert!(raw.contains("\"pickupTime\":\"10:15\""));
    }

    #[test]
    fn test_signed_in_customer_name_is_used() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.sign_in("Léa").unwrap();

        let order = submit_one(&mut customer, "mocha", "11:00");
        assert_eq!(order.customer, "Léa");

        customer.sign_out().unwrap();
        let order = submit_one(&mut customer, "mocha", "11:05");
        assert_eq!(order.customer, "Invité");
    }

    #[test]
    fn test_newest_order_is_stored_first() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        submit_one(&mut customer, "espresso", "10:00");
        submit_one(&mut customer, "cookie", "10:30");

        let ids: Vec<String> = store.orders().unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["#2", "#1"]);
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();

        let err = customer.submit(&checkout("10:15")).unwrap_err();
        assert!(matches!(err, AppError::EmptyCart));
        assert!(store.orders().unwrap().is_empty());
        assert_eq!(store.order_counter().unwrap(), 0);
    }

    #[test]
    fn test_missing_pickup_time_is_rejected_and_cart_kept() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.add_to_cart("cappuccino").unwrap();

        let err = customer.submit(&checkout("")).unwrap_err();
        assert!(matches!(err, AppError::MissingPickupTime));
        assert_eq!(customer.cart().count(), 1);
        assert!(store.orders().unwrap().is_empty());
        assert_eq!(store.order_counter().unwrap(), 0);
    }

    #[test]
    fn test_paused_service_blocks_ordering() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.add_to_cart("espresso").unwrap();
        store.set_service_paused(true).unwrap();

        assert!(matches!(
            customer.submit(&checkout("10:15")).unwrap_err(),
            AppError::ServicePaused
        ));
        assert!(matches!(
            customer.add_to_cart("espresso").unwrap_err(),
            AppError::ServicePaused
        ));
        assert!(store.orders().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_menu_item_is_not_added() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store, dyn_clock(&clock)).unwrap();
        assert!(!customer.add_to_cart("croissant").unwrap());
        assert!(customer.cart().is_empty());
    }

    #[test]
    fn test_manual_order_shares_the_counter() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        submit_one(&mut customer, "espresso", "10:00");
        let manual = staff.create_manual_order().unwrap();
        let next = submit_one(&mut customer, "espresso", "10:05");

        assert_eq!(manual.id, "#2");
        assert_eq!(manual.items[0].name, "Commande Manuelle");
        assert!((manual.total - 5.0).abs() < 0.001);
        assert_eq!(manual.pickup_time, None);
        assert_eq!(next.id, "#3");
    }

    #[test]
    fn test_set_status_unknown_id_leaves_orders_untouched() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        book.create_manual_order().unwrap();
        let before = store.raw(StoreKey::Orders).unwrap();

        let result = book.set_status("#42", OrderStatus::Ready).unwrap();

        assert!(result.is_none());
        assert_eq!(store.raw(StoreKey::Orders).unwrap(), before);
        assert!(store.activity_log().unwrap().is_empty());
    }

    #[test]
    fn test_mark_ready_logs_activity_once() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        let order = staff.create_manual_order().unwrap();

        let updated = staff.mark_ready(&order.id).unwrap().unwrap();
        assert_eq!(updated.status, OrderStatus::Ready);
        staff.mark_ready(&order.id).unwrap();

        let log = store.activity_log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text, "Commande #1 marquée comme: Prêt");
    }

    #[test]
    fn test_ready_cannot_return_to_pending() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        let order = book.create_manual_order().unwrap();
        book.set_status(&order.id, OrderStatus::Ready).unwrap();

        let err = book.set_status(&order.id, OrderStatus::Pending).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert_eq!(book.get(&order.id).unwrap().unwrap().status, OrderStatus::Ready);
    }

    #[test]
    fn test_set_total_rejects_non_numeric() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        let order = book.create_manual_order().unwrap();

        let err = book
            .set_total(&order.id, &TotalForm { amount: "abc".to_string() })
            .unwrap_err();
        assert!(matches!(err, AppError::Form(FormError::InvalidAmount(_))));
        assert!((book.get(&order.id).unwrap().unwrap().total - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_set_total_overrides_item_sum() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        let order = book.create_manual_order().unwrap();

        let updated = book
            .set_total(&order.id, &TotalForm { amount: "3,50".to_string() })
            .unwrap()
            .unwrap();
        assert!((updated.total - 3.5).abs() < 0.001);
        assert!((updated.items[0].subtotal() - 5.0).abs() < 0.001);

        let missing = book
            .set_total("#9", &TotalForm { amount: "1".to_string() })
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_delete_order() {
        let (store, clock) = setup();
        let book = OrderBook::new(store.clone(), dyn_clock(&clock));
        let first = book.create_manual_order().unwrap();
        book.create_manual_order().unwrap();

        assert!(book.delete_order(&first.id).unwrap());
        assert!(!book.delete_order(&first.id).unwrap());
        let remaining: Vec<String> = store.orders().unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(remaining, vec!["#2"]);
    }

    // ===== DISPLAY ORDER TESTS =====

    #[test]
    fn test_pending_sorts_before_ready_regardless_of_pickup() {
        let pending = order("#1", OrderStatus::Pending, Some("09:00"), at(18, 8, 0));
        let ready = order("#2", OrderStatus::Ready, Some("08:00"), at(18, 8, 5));

        let mut orders = vec![ready, pending];
        orders.sort_by(display_order);
        assert_eq!(orders[0].id, "#1");
    }

    #[test]
    fn test_pending_by_pickup_then_newest_first() {
        let mut orders = vec![
            order("#1", OrderStatus::Pending, Some("10:30"), at(18, 8, 0)),
            order("#2", OrderStatus::Pending, Some("09:15"), at(18, 8, 10)),
            order("#3", OrderStatus::Pending, None, at(18, 8, 20)),
            order("#4", OrderStatus::Ready, Some("08:00"), at(18, 8, 1)),
            order("#5", OrderStatus::Ready, Some("07:45"), at(18, 8, 30)),
            order("#6", OrderStatus::Pending, Some("09:15"), at(18, 8, 40)),
        ];
        orders.sort_by(display_order);

        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["#6", "#2", "#1", "#3", "#5", "#4"]);
    }

    // ===== NOTIFICATION TESTS =====

    #[test]
    fn test_ready_order_notified_once() {
        let (store, clock) = setup();
        let session = SessionStore::new();
        let mut ready = order("#3", OrderStatus::Ready, Some("10:00"), clock.now());
        ready.customer = "Invité".to_string();
        store.set_orders(&[ready]).unwrap();
        track_order_for_notification(&session, "#3").unwrap();

        let first = check_order_notifications(&session, &store).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].order_id, "#3");
        assert!(first[0].message.contains("#3"));
        assert!(session.tracked_orders().unwrap().is_empty());

        let second = check_order_notifications(&session, &store).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_pending_stays_tracked_and_deleted_is_dropped() {
        let (store, clock) = setup();
        let session = SessionStore::new();
        store
            .set_orders(&[order("#1", OrderStatus::Pending, Some("10:00"), clock.now())])
            .unwrap();
        track_order_for_notification(&session, "#1").unwrap();
        track_order_for_notification(&session, "#2").unwrap();

        let notices = check_order_notifications(&session, &store).unwrap();
        assert!(notices.is_empty());
        assert_eq!(session.tracked_orders().unwrap(), vec!["#1".to_string()]);
    }

    #[test]
    fn test_tracking_is_per_view() {
        let (store, clock) = setup();
        let mut first = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        let second = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        let order = submit_one(&mut first, "espresso", "10:00");
        staff.mark_ready(&order.id).unwrap();

        assert!(second.check_notifications().unwrap().is_empty());
        assert_eq!(first.check_notifications().unwrap().len(), 1);
    }

    #[test]
    fn test_my_orders_includes_tracked_and_named() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        let mine = submit_one(&mut customer, "espresso", "10:00");
        staff.create_manual_order().unwrap();
        assert_eq!(customer.my_orders().unwrap().len(), 1);
        assert_eq!(customer.my_orders().unwrap()[0].id, mine.id);

        let mut other = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        other.sign_in("Hugo").unwrap();
        submit_one(&mut other, "mocha", "10:10");
        let fresh = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        assert_eq!(fresh.my_orders().unwrap().len(), 1);
    }

    // ===== SYNC TESTS =====

    #[test]
    fn test_customer_reloads_on_menu_change_and_loses_cart() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        customer.add_to_cart("espresso").unwrap();

        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        staff
            .add_menu_item(
                "cookies",
                &MenuItemForm {
                    name: "Financier".to_string(),
                    price: "2.8".to_string(),
                },
            )
            .unwrap();

        match customer.poll_changes().unwrap() {
            Some(CustomerReaction::Reloaded(snapshot)) => {
                let cookies = snapshot
                    .menu
                    .categories
                    .iter()
                    .find(|c| c.id == "cookies")
                    .unwrap();
                assert!(cookies.items.iter().any(|i| i.name == "Financier"));
            }
            other => panic!("expected reload, got {other:?}"),
        }
        assert!(customer.cart().is_empty());
        assert!(customer.poll_changes().unwrap().is_none());
    }

    #[test]
    fn test_burst_of_changes_reloads_once() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        staff
            .post_broadcast(&BroadcastForm {
                message: "  Nouveau : chai latte ".to_string(),
            })
            .unwrap();
        staff.toggle_service().unwrap();

        match customer.poll_changes().unwrap() {
            Some(CustomerReaction::Reloaded(snapshot)) => {
                assert_eq!(snapshot.banner.as_deref(), Some("Nouveau : chai latte"));
                assert!(snapshot.paused);
            }
            other => panic!("expected reload, got {other:?}"),
        }
        assert!(customer.poll_changes().unwrap().is_none());
    }

    #[test]
    fn test_pause_banner_shown_without_broadcast() {
        let (store, clock) = setup();
        let customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        assert_eq!(customer.banner().unwrap(), None);

        store.set_service_paused(true).unwrap();
        assert_eq!(
            customer.banner().unwrap().as_deref(),
            Some(crate::views::customer::PAUSE_BANNER)
        );
    }

    #[test]
    fn test_customer_notified_when_staff_marks_ready() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        let order = submit_one(&mut customer, "matcha-latte", "09:30");

        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        staff.mark_ready(&order.id).unwrap();

        match customer.poll_changes().unwrap() {
            Some(CustomerReaction::OrdersChanged(notices)) => {
                assert_eq!(notices.len(), 1);
                assert_eq!(notices[0].order_id, order.id);
            }
            other => panic!("expected orders change, got {other:?}"),
        }
        assert!(customer.tracked_orders().unwrap().is_empty());
    }

    #[test]
    fn test_staff_board_refreshes_on_new_order() {
        let (store, clock) = setup();
        let mut staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        staff.load().unwrap();

        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        submit_one(&mut customer, "cold-brew", "12:00");

        let reactions = staff.poll_changes().unwrap();
        let board = reactions
            .iter()
            .find_map(|r| match r {
                StaffReaction::OrdersChanged(board) => Some(board),
                _ => None,
            })
            .expect("orders refresh");
        assert_eq!(board.orders.len(), 1);
        assert_eq!(board.stats.clients, 1);
        assert!(board.activity[0].text.starts_with("Nouvelle commande (#1): 1x Cold brew"));
        assert_eq!(
            reactions
                .iter()
                .filter(|r| matches!(r, StaffReaction::OrdersChanged(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_staff_session_check_and_logout() {
        let (store, clock) = setup();
        let mut staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        assert_eq!(staff.check_session().unwrap(), SessionCheck::RedirectToLogin);

        store.set_staff_session().unwrap();
        staff.load().unwrap();
        assert_eq!(staff.check_session().unwrap(), SessionCheck::Authorized);

        staff.logout().unwrap();
        assert_eq!(staff.check_session().unwrap(), SessionCheck::RedirectToLogin);
        assert!(staff
            .poll_changes()
            .unwrap()
            .iter()
            .any(|r| matches!(r, StaffReaction::SessionEnded)));
    }

    #[test]
    fn test_daily_reset_reaches_both_views() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        submit_one(&mut customer, "espresso", "09:10");
        let mut staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        staff.load().unwrap();
        customer.poll_changes().unwrap();

        clock.set(at(19, 0, 0));
        let (reset, board) = staff.load().unwrap();
        assert!(matches!(reset, ResetOutcome::Wiped { .. }));
        assert!(board.orders.is_empty());

        // Tracked order vanished with the wipe
        assert!(matches!(
            customer.poll_changes().unwrap(),
            Some(CustomerReaction::OrdersChanged(ref notices)) if notices.is_empty()
        ));
        assert!(customer.tracked_orders().unwrap().is_empty());
    }

    // ===== MENU TESTS =====

    #[test]
    fn test_default_menu_until_first_edit() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        assert_eq!(staff.menu().unwrap().categories.len(), 6);
        assert!(store.menu().unwrap().is_none());

        staff.delete_category("cookies").unwrap();
        assert_eq!(store.menu().unwrap().unwrap().categories.len(), 5);
    }

    #[test]
    fn test_menu_crud_round() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        let menu = staff
            .add_category(&CategoryForm {
                label: "Pâtisseries".to_string(),
            })
            .unwrap();
        let category = menu.categories.last().unwrap().clone();
        assert!(category.id.starts_with("cat-"));
        assert_eq!(category.label, "Pâtisseries");

        let menu = staff
            .add_menu_item(
                &category.id,
                &MenuItemForm {
                    name: "Madeleine".to_string(),
                    price: "2".to_string(),
                },
            )
            .unwrap();
        let item_id = menu.categories.last().unwrap().items[0].id.clone();
        assert!(item_id.starts_with("item-"));

        let menu = staff
            .update_menu_item(
                &category.id,
                &item_id,
                &MenuItemForm {
                    name: "Madeleine au miel".to_string(),
                    price: "2.40".to_string(),
                },
            )
            .unwrap();
        let item = menu.find_item(&item_id).unwrap();
        assert_eq!(item.name, "Madeleine au miel");
        assert!((item.price - 2.4).abs() < 0.001);

        let menu = staff.delete_menu_item(&category.id, &item_id).unwrap();
        assert!(menu.find_item(&item_id).is_none());

        // Persisted value matches the in-memory one
        assert_eq!(store.menu().unwrap().unwrap(), *staff.menu().unwrap());
    }

    #[test]
    fn test_invalid_price_leaves_menu_unchanged() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        let before = staff.menu().unwrap();

        let err = staff
            .update_menu_item(
                "espresso",
                "espresso",
                &MenuItemForm {
                    name: "Espresso".to_string(),
                    price: "deux".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Form(FormError::InvalidAmount(_))));
        assert_eq!(staff.menu().unwrap(), before);
        assert!(store.menu().unwrap().is_none());
    }

    #[test]
    fn test_edit_of_unknown_target_writes_nothing() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        customer.add_to_cart("espresso").unwrap();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        staff.delete_menu_item("espresso", "croissant").unwrap();
        staff.delete_category("brunch").unwrap();
        staff
            .update_menu_item(
                "brunch",
                "croissant",
                &MenuItemForm {
                    name: "Croissant".to_string(),
                    price: "1.5".to_string(),
                },
            )
            .unwrap();

        assert!(store.menu().unwrap().is_none());
        assert!(customer.poll_changes().unwrap().is_none());
        assert_eq!(customer.cart().count(), 1);
    }

    #[test]
    fn test_reorder_categories() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        let menu = staff
            .reorder_categories(&["tea".to_string(), "unknown".to_string(), "espresso".to_string()])
            .unwrap();
        let ids: Vec<&str> = menu.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["tea", "espresso", "flavored-latte", "matcha", "brew", "cookies"]
        );
    }

    #[test]
    fn test_unique_ids_for_same_instant_additions() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store, dyn_clock(&clock)).unwrap();
        let form = CategoryForm {
            label: "Brunch".to_string(),
        };
        staff.add_category(&form).unwrap();
        let menu = staff.add_category(&form).unwrap();

        let n = menu.categories.len();
        assert_ne!(menu.categories[n - 1].id, menu.categories[n - 2].id);
    }

    // ===== ACTIVITY & STATS TESTS =====

    #[test]
    fn test_activity_log_capped_newest_first() {
        let (store, clock) = setup();
        for i in 0..60 {
            log_activity(&store, clock.as_ref(), &format!("entry {i}")).unwrap();
            clock.advance(chrono::Duration::seconds(1));
        }

        let log = store.activity_log().unwrap();
        assert_eq!(log.len(), 50);
        assert_eq!(log[0].text, "entry 59");
        assert_eq!(log[49].text, "entry 10");
    }

    #[test]
    fn test_broadcast_and_service_are_logged() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();

        staff
            .post_broadcast(&BroadcastForm {
                message: "Fermeture à 18h".to_string(),
            })
            .unwrap();
        assert!(staff.toggle_service().unwrap());
        assert!(!staff.toggle_service().unwrap());
        staff.clear_broadcast().unwrap();

        let texts: Vec<String> = store
            .activity_log()
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(
            texts,
            vec![
                "Message broadcast supprimé",
                "Service RELANCÉ",
                "Service mis en PAUSE",
                "Message broadcast mis à jour: \"Fermeture à 18h\"",
            ]
        );
        assert_eq!(store.broadcast().unwrap(), None);
    }

    #[test]
    fn test_empty_broadcast_is_rejected() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        assert!(staff
            .post_broadcast(&BroadcastForm {
                message: "   ".to_string()
            })
            .is_err());
        assert!(store.activity_log().unwrap().is_empty());
    }

    #[test]
    fn test_recent_activity_merges_orders_and_logs() {
        let (store, clock) = setup();
        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        let order = staff.create_manual_order().unwrap();
        clock.advance(chrono::Duration::minutes(5));
        staff.mark_ready(&order.id).unwrap();

        let feed = recent_activity(&store, 10).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].text, "Commande #1 marquée comme: Prêt");
        assert_eq!(feed[0].time, "09:05");
        assert_eq!(feed[1].text, "Nouvelle commande (#1): 1x Commande Manuelle");
    }

    #[test]
    fn test_dashboard_statistics() {
        let (store, clock) = setup();
        let mut customer = CustomerView::open(store.clone(), dyn_clock(&clock)).unwrap();
        customer.load().unwrap();
        customer.add_to_cart("espresso").unwrap();
        customer.add_to_cart("espresso").unwrap();
        customer.add_to_cart("cookie").unwrap();
        customer.submit(&checkout("09:30")).unwrap();
        submit_one(&mut customer, "cookie", "09:45");

        clock.set(at(18, 14, 10));
        customer.load().unwrap();

        let staff = StaffDashboard::open(store.clone(), dyn_clock(&clock)).unwrap();
        let stats = staff.stats().unwrap();
        assert_eq!(stats.clients, 2);
        assert_eq!(stats.items_served, 4);
        assert!((stats.revenue_today - (2.5 * 2.0 + 3.8 * 2.0)).abs() < 0.001);
        assert_eq!(stats.visits_today, 2);

        let breakdown = staff.drink_breakdown().unwrap();
        assert_eq!(breakdown.len(), 2);
        assert!(breakdown.iter().all(|d| d.qty == 2));

        let flux = staff.visit_flux().unwrap();
        assert_eq!(flux[9], 1);
        assert_eq!(flux[14], 1);
        assert_eq!(flux.iter().sum::<u32>(), 2);
    }

    #[test]
    fn test_suggested_pickup_time_is_ten_minutes_ahead() {
        let (store, clock) = setup();
        clock.set(at(18, 9, 55));
        let customer = CustomerView::open(store, dyn_clock(&clock)).unwrap();
        assert_eq!(customer.suggested_pickup_time(), "10:05");
    }
}
