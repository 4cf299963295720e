//! The client state controller.
//!
//! `Controller` owns the canonical transaction collection, the period selection, the chart toggle
//! and the entry form. It publishes every change as an immutable `State` snapshot through a
//! `tokio::sync::watch` channel. The collection only ever changes through `load`, `create`,
//! `update` and `delete`, and only after the store has confirmed the operation.

use crate::error::{Fault, Operation};
use crate::finance::{
    compute_balance, compute_daily_balances, integrity_faults, Balance, DataIntegrityFault,
};
use crate::form::TransactionForm;
use crate::model::{Transaction, TransactionType};
use crate::period::Period;
use crate::store::{Store, StoreError};
use crate::validation::{validate, TransactionInput};
use crate::view::{
    build_calendar_events, category_chart, daily_bar_chart, CalendarEntry, CategorySeries,
    ChartData, DailyBarSeries,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Whether the initial fetch has resolved.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
}

serde_plain::derive_display_from_serialize!(LoadState);

/// The "operation failed" notice shown after a store fault. It stays until dismissed or until
/// another operation succeeds.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Notice {
    pub operation: Operation,
    pub id: Option<String>,
    pub message: String,
}

/// What `submit` did with the form.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "id")]
pub enum Submission {
    Created(String),
    Updated(String),
}

/// A snapshot of the controller's state, with the derived views computed on read.
#[derive(Debug, Clone)]
pub struct State {
    load_state: LoadState,
    transactions: Vec<Transaction>,
    period: Period,
    chart_type: TransactionType,
    form: TransactionForm,
    notice: Option<Notice>,
}

impl State {
    fn new(today: NaiveDate, chart_type: TransactionType) -> Self {
        Self {
            load_state: LoadState::Loading,
            transactions: Vec::new(),
            period: Period::new(today),
            chart_type,
            form: TransactionForm::new(today),
            notice: None,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// The whole canonical collection, in store order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Which transaction type the category chart shows.
    pub fn chart_type(&self) -> TransactionType {
        self.chart_type
    }

    pub fn form(&self) -> &TransactionForm {
        &self.form
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Transactions dated in the viewed month.
    pub fn monthly_transactions(&self) -> Vec<Transaction> {
        let month = self.period.current_month();
        self.transactions
            .iter()
            .filter(|t| t.in_month(month))
            .cloned()
            .collect()
    }

    /// Transactions of the viewed month dated on the selected day.
    pub fn daily_transactions(&self) -> Vec<Transaction> {
        let day = self.period.current_day();
        self.monthly_transactions()
            .into_iter()
            .filter(|t| t.on_day(day))
            .collect()
    }

    pub fn monthly_balance(&self) -> Balance {
        compute_balance(&self.monthly_transactions())
    }

    pub fn daily_balance(&self) -> Balance {
        compute_balance(&self.daily_transactions())
    }

    /// Per-day balances of the viewed month.
    pub fn daily_balances(&self) -> BTreeMap<String, Balance> {
        compute_daily_balances(&self.monthly_transactions())
    }

    pub fn calendar_events(&self) -> Vec<CalendarEntry> {
        build_calendar_events(&self.daily_balances(), &self.period.day_key())
    }

    pub fn category_chart(&self) -> ChartData<CategorySeries> {
        category_chart(
            &self.monthly_transactions(),
            self.chart_type,
            self.is_loading(),
        )
    }

    pub fn daily_bar_chart(&self) -> ChartData<DailyBarSeries> {
        daily_bar_chart(&self.monthly_transactions(), self.is_loading())
    }

    /// Loaded transactions whose category does not belong to their type.
    pub fn integrity_faults(&self) -> Vec<DataIntegrityFault> {
        integrity_faults(&self.transactions)
    }
}

/// Owns the client state and drives the store. Clones share the same state.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn Store>,
    state: watch::Sender<State>,
    detached: AtomicBool,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &*self.inner.state.borrow())
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// A controller in the `Loading` state, with `today` selected and the expense chart shown.
    pub fn new(store: Arc<dyn Store>, today: NaiveDate) -> Self {
        Self::with_chart_type(store, today, TransactionType::default())
    }

    pub fn with_chart_type(
        store: Arc<dyn Store>,
        today: NaiveDate,
        chart_type: TransactionType,
    ) -> Self {
        let (state, _) = watch::channel(State::new(today, chart_type));
        Self {
            inner: Arc::new(Inner {
                store,
                state,
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> State {
        self.inner.state.borrow().clone()
    }

    /// A receiver that sees every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.inner.state.subscribe()
    }

    /// Marks the owner of this controller as gone. Store operations that resolve after this are
    /// logged and otherwise ignored.
    pub fn detach(&self) {
        debug!("Controller detached");
        self.inner.detached.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::SeqCst)
    }

    /// Fetches the full collection and replaces the canonical state with it.
    ///
    /// On failure the collection keeps its previous value. Either way the state ends up `Ready`.
    pub async fn load(&self) -> Result<(), Fault> {
        debug!("Loading transactions");
        let result = self.inner.store.fetch_all().await;
        if self.discard(Operation::Load, None) {
            return result
                .map(|_| ())
                .map_err(|e| Fault::store(Operation::Load, None, e));
        }
        match result {
            Ok(transactions) => {
                info!("Loaded {} transactions", transactions.len());
                for fault in integrity_faults(&transactions) {
                    warn!("{fault}");
                }
                self.modify(|state| {
                    state.transactions = transactions;
                    state.load_state = LoadState::Ready;
                    state.notice = None;
                });
                Ok(())
            }
            Err(e) => {
                let fault = self.fail(Operation::Load, None, e);
                self.modify(|state| state.load_state = LoadState::Ready);
                Err(fault)
            }
        }
    }

    /// Validates `input`, has the store create it and appends the result with its assigned id.
    pub async fn create(&self, input: &TransactionInput) -> Result<String, Fault> {
        let payload = validate(input).inspect_err(|e| debug!("Create rejected: {e}"))?;
        let id = self
            .inner
            .store
            .create(&payload)
            .await
            .map_err(|e| self.fail(Operation::Create, None, e))?;
        if self.discard(Operation::Create, Some(&id)) {
            return Ok(id);
        }
        info!("Created transaction '{id}'");
        let transaction = Transaction::new(id.clone(), payload);
        self.modify(|state| {
            state.transactions.push(transaction);
            state.notice = None;
        });
        Ok(id)
    }

    /// Validates `input`, has the store overwrite transaction `id` with it and then patches the
    /// local copy in place.
    pub async fn update(&self, input: &TransactionInput, id: &str) -> Result<(), Fault> {
        let payload = validate(input).inspect_err(|e| debug!("Update of '{id}' rejected: {e}"))?;
        self.inner
            .store
            .update(id, &payload)
            .await
            .map_err(|e| self.fail(Operation::Update, Some(id), e))?;
        if self.discard(Operation::Update, Some(id)) {
            return Ok(());
        }
        info!("Updated transaction '{id}'");
        self.modify(|state| {
            for transaction in state.transactions.iter_mut().filter(|t| t.id == id) {
                transaction.apply(payload.clone());
            }
            state.notice = None;
        });
        Ok(())
    }

    /// Has the store delete transaction `id` and then removes it locally. Deleting the selected
    /// transaction also clears the selection.
    pub async fn delete(&self, id: &str) -> Result<(), Fault> {
        self.inner
            .store
            .delete(id)
            .await
            .map_err(|e| self.fail(Operation::Delete, Some(id), e))?;
        if self.discard(Operation::Delete, Some(id)) {
            return Ok(());
        }
        info!("Deleted transaction '{id}'");
        self.modify(|state| {
            let before = state.transactions.len();
            state.transactions.retain(|t| t.id != id);
            if state.transactions.len() == before {
                debug!("Transaction '{id}' was not in the local collection");
            }
            if state.form.selected_id() == Some(id) {
                state.form.reset(state.period.current_day());
            }
            state.notice = None;
        });
        Ok(())
    }

    /// Submits the entry form: an update of the selected transaction if there is one, a create
    /// otherwise. On success the form goes back to its defaults.
    pub async fn submit(&self) -> Result<Submission, Fault> {
        let (input, selected) = {
            let state = self.inner.state.borrow();
            (
                state.form.input(),
                state.form.selected_id().map(str::to_string),
            )
        };
        let submission = match selected {
            Some(id) => {
                self.update(&input, &id).await?;
                Submission::Updated(id)
            }
            None => Submission::Created(self.create(&input).await?),
        };
        if !self.is_detached() {
            self.modify(|state| state.form.reset(state.period.current_day()));
        }
        Ok(submission)
    }

    /// Deletes the transaction selected in the form, if any.
    pub async fn delete_selected(&self) -> Result<Option<String>, Fault> {
        let selected = self
            .inner
            .state
            .borrow()
            .form
            .selected_id()
            .map(str::to_string);
        match selected {
            Some(id) => {
                self.delete(&id).await?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Selects transaction `id` for editing. Returns false if there is no such transaction.
    pub fn select(&self, id: &str) -> bool {
        let mut found = false;
        self.modify(|state| {
            if let Some(transaction) = state.transactions.iter().find(|t| t.id == id) {
                state.form.select(transaction.clone());
                found = true;
            }
        });
        found
    }

    /// Leaves edit mode and restores the form defaults.
    pub fn clear_selection(&self) {
        self.modify(|state| state.form.reset(state.period.current_day()));
    }

    /// Changes the entry form's fields. Use `set_form_type` to switch income and expense.
    pub fn edit_form(&self, f: impl FnOnce(&mut TransactionForm)) {
        self.modify(|state| f(&mut state.form));
    }

    pub fn set_form_type(&self, kind: TransactionType) {
        self.modify(|state| state.form.set_type(kind));
    }

    pub fn set_chart_type(&self, kind: TransactionType) {
        self.modify(|state| state.chart_type = kind);
    }

    pub fn set_current_month(&self, date: NaiveDate) {
        self.modify(|state| {
            state.period.set_current_month(date);
            state.form.follow_day(state.period.current_day());
        });
    }

    pub fn set_current_day(&self, day: NaiveDate) {
        self.modify(|state| {
            state.period.set_current_day(day);
            state.form.follow_day(day);
        });
    }

    pub fn next_month(&self) {
        self.modify(|state| {
            state.period.next_month();
            state.form.follow_day(state.period.current_day());
        });
    }

    pub fn previous_month(&self) {
        self.modify(|state| {
            state.period.previous_month();
            state.form.follow_day(state.period.current_day());
        });
    }

    pub fn dismiss_notice(&self) {
        self.modify(|state| state.notice = None);
    }

    fn modify(&self, f: impl FnOnce(&mut State)) {
        self.inner.state.send_modify(f);
    }

    /// True, after logging, when a store operation resolved after `detach`.
    fn discard(&self, operation: Operation, id: Option<&str>) -> bool {
        let detached = self.is_detached();
        if detached {
            debug!(
                "Discarding {operation} result for {} after detach",
                id.unwrap_or("the collection")
            );
        }
        detached
    }

    /// Logs a store fault, raises the notice and wraps the fault for the caller.
    fn fail(&self, operation: Operation, id: Option<&str>, source: StoreError) -> Fault {
        let target = id.unwrap_or("-");
        match &source {
            StoreError::Known { code, message } => {
                error!("{operation} failed (id: {target}) with store error [{code}]: {message}")
            }
            StoreError::Unknown(e) => error!("{operation} failed (id: {target}): {e:#}"),
        }
        if !self.is_detached() {
            let notice = Notice {
                operation,
                id: id.map(str::to_string),
                message: format!("{operation} failed"),
            };
            self.modify(|state| state.notice = Some(notice));
        }
        Fault::store(operation, id, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category};
    use crate::store::{MemoryStore, NOT_FOUND, UNAVAILABLE};
    use crate::test::{fixture, lunch, txn};

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    async fn loaded(store: MemoryStore) -> (Arc<MemoryStore>, Controller) {
        let store = Arc::new(store);
        let controller = Controller::new(store.clone(), may(17));
        controller.load().await.unwrap();
        (store, controller)
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let controller = Controller::new(Arc::new(MemoryStore::default()), may(17));
        let state = controller.snapshot();
        assert!(state.is_loading());
        assert_eq!(state.category_chart(), ChartData::Loading);
        assert_eq!(state.daily_bar_chart(), ChartData::Loading);
    }

    #[tokio::test]
    async fn test_load_empty_is_ready_with_no_data() {
        let (_, controller) = loaded(MemoryStore::default()).await;
        let state = controller.snapshot();
        assert_eq!(state.load_state(), LoadState::Ready);
        assert!(state.transactions().is_empty());
        assert_eq!(state.category_chart(), ChartData::NoData);
        assert_eq!(state.daily_bar_chart(), ChartData::NoData);
    }

    #[tokio::test]
    async fn test_failed_load_still_becomes_ready() {
        let store = Arc::new(MemoryStore::new(fixture()));
        store
            .fail_next(StoreError::known(UNAVAILABLE, "offline"))
            .await;
        let controller = Controller::new(store.clone(), may(17));
        let fault = controller.load().await.unwrap_err();
        assert!(!fault.is_validation());
        let state = controller.snapshot();
        assert_eq!(state.load_state(), LoadState::Ready);
        assert!(state.transactions().is_empty());
        assert_eq!(state.notice().unwrap().operation, Operation::Load);
    }

    #[tokio::test]
    async fn test_monthly_and_daily_views() {
        let mut data = fixture();
        data.push(txn(
            "april",
            TransactionType::Expense,
            "2024-04-30",
            999,
            Category::Food,
        ));
        let (_, controller) = loaded(MemoryStore::new(data)).await;
        controller.set_current_day(may(3));
        let state = controller.snapshot();
        assert_eq!(state.monthly_transactions().len(), 6);
        assert_eq!(state.daily_transactions().len(), 2);
        assert_eq!(
            state.monthly_balance(),
            Balance {
                income: 305_000,
                expense: 90_000,
                balance: 215_000
            }
        );
        assert_eq!(
            state.daily_balance(),
            Balance {
                income: 0,
                expense: 2_000,
                balance: -2_000
            }
        );
        let highlight = state
            .calendar_events()
            .into_iter()
            .filter(|e| e.is_highlight())
            .collect::<Vec<_>>();
        assert_eq!(highlight.len(), 1);
        assert_eq!(highlight[0].start(), "2024-05-03");
    }

    #[tokio::test]
    async fn test_create_appends_with_assigned_id() {
        let (_, controller) = loaded(MemoryStore::default().with_ids(["abc123"])).await;
        let id = controller
            .create(&lunch("2024-05-03", 1200).into())
            .await
            .unwrap();
        assert_eq!(id, "abc123");
        let state = controller.snapshot();
        assert_eq!(
            state.transactions(),
            &[Transaction::new("abc123", lunch("2024-05-03", 1200))]
        );
        assert_eq!(
            state.daily_balances().get("2024-05-03"),
            Some(&Balance {
                income: 0,
                expense: 1200,
                balance: -1200
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_store() {
        let (store, controller) = loaded(MemoryStore::default()).await;
        store
            .fail_next(StoreError::known(UNAVAILABLE, "would fail"))
            .await;
        let mut input: TransactionInput = lunch("2024-05-03", 1200).into();
        input.amount = 0;
        let fault = controller.create(&input).await.unwrap_err();
        assert!(fault.is_validation());
        assert!(controller.snapshot().notice().is_none());
        // The queued failure is still there because the store was never called.
        assert!(controller.load().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_create_is_not_reflected() {
        let (store, controller) = loaded(MemoryStore::new(fixture())).await;
        store
            .fail_next(StoreError::unknown(anyhow::anyhow!("socket closed")))
            .await;
        let before = controller.snapshot().transactions().to_vec();
        let fault = controller
            .create(&lunch("2024-05-03", 1200).into())
            .await
            .unwrap_err();
        assert!(matches!(
            fault,
            Fault::Store {
                operation: Operation::Create,
                ..
            }
        ));
        let state = controller.snapshot();
        assert_eq!(state.transactions(), before.as_slice());
        assert_eq!(state.notice().unwrap().message, "create failed");
    }

    #[tokio::test]
    async fn test_update_patches_in_place_and_is_idempotent() {
        let (_, controller) = loaded(MemoryStore::new(fixture())).await;
        let mut payload = lunch("2024-05-03", 1500);
        payload.content = "team lunch".to_string();
        controller.update(&payload.clone().into(), "t2").await.unwrap();
        let once = controller.snapshot().transactions().to_vec();
        controller.update(&payload.clone().into(), "t2").await.unwrap();
        let twice = controller.snapshot().transactions().to_vec();
        assert_eq!(once, twice);

        let index = fixture().iter().position(|t| t.id == "t2").unwrap();
        assert_eq!(twice[index], Transaction::new("t2", payload));
        for (i, (after, before)) in twice.iter().zip(fixture()).enumerate() {
            if i != index {
                assert_eq!(after, &before);
            }
        }
    }

    #[tokio::test]
    async fn test_failed_update_leaves_state() {
        let (_, controller) = loaded(MemoryStore::new(fixture())).await;
        let fault = controller
            .update(&lunch("2024-05-03", 1).into(), "missing")
            .await
            .unwrap_err();
        match fault {
            Fault::Store { id, source, .. } => {
                assert_eq!(id.as_deref(), Some("missing"));
                assert_eq!(source.code(), Some(NOT_FOUND));
            }
            other => panic!("unexpected fault: {other}"),
        }
        assert_eq!(controller.snapshot().transactions(), fixture().as_slice());
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_a_no_op() {
        let (_, controller) = loaded(MemoryStore::new(fixture())).await;
        controller.delete("nope").await.unwrap();
        assert_eq!(controller.snapshot().transactions(), fixture().as_slice());
    }

    #[tokio::test]
    async fn test_delete_selected_clears_selection() {
        let (store, controller) = loaded(MemoryStore::new(fixture())).await;
        assert!(controller.select("t1"));
        assert_eq!(controller.delete_selected().await.unwrap().as_deref(), Some("t1"));
        let state = controller.snapshot();
        assert!(state.form().selected().is_none());
        assert!(state.transactions().iter().all(|t| t.id != "t1"));
        assert!(store.snapshot().await.iter().all(|t| t.id != "t1"));
    }

    #[tokio::test]
    async fn test_submit_creates_then_updates() {
        let (_, controller) = loaded(MemoryStore::default().with_ids(["n1"])).await;
        controller.set_current_day(may(3));
        controller.edit_form(|form| {
            form.set_amount(1200);
            form.set_category(Category::Food.to_string());
            form.set_content("lunch");
        });
        let created = controller.submit().await.unwrap();
        assert_eq!(created, Submission::Created("n1".to_string()));
        assert_eq!(controller.snapshot().form(), &TransactionForm::new(may(3)));

        assert!(controller.select("n1"));
        controller.edit_form(|form| form.set_amount(1300));
        let updated = controller.submit().await.unwrap();
        assert_eq!(updated, Submission::Updated("n1".to_string()));
        let state = controller.snapshot();
        assert!(state.form().selected().is_none());
        assert_eq!(state.transactions()[0].amount, Amount::new(1300));
    }

    #[tokio::test]
    async fn test_success_clears_notice() {
        let (store, controller) = loaded(MemoryStore::new(fixture())).await;
        store
            .fail_next(StoreError::known(UNAVAILABLE, "offline"))
            .await;
        assert!(controller.delete("t1").await.is_err());
        assert!(controller.snapshot().notice().is_some());
        controller.delete("t1").await.unwrap();
        assert!(controller.snapshot().notice().is_none());
    }

    #[tokio::test]
    async fn test_mismatched_record_is_flagged_and_left_out_of_the_chart() {
        let mut data = fixture();
        data.push(txn("bad", TransactionType::Income, "2024-05-03", 999, Category::Food));
        let (_, controller) = loaded(MemoryStore::new(data)).await;
        controller.set_chart_type(TransactionType::Income);
        let state = controller.snapshot();
        assert_eq!(state.transactions().len(), 7);
        assert_eq!(state.integrity_faults().len(), 1);
        let first = state.category_chart();
        assert_eq!(first.ready().unwrap().values, vec![300_000, 5_000]);
        assert_eq!(state.category_chart(), first);
        assert_eq!(state.monthly_balance().income, 305_999);
    }

    #[tokio::test]
    async fn test_chart_toggle_recomputes_without_fetch() {
        let (store, controller) = loaded(MemoryStore::new(fixture())).await;
        store
            .fail_next(StoreError::known(UNAVAILABLE, "must not be fetched"))
            .await;
        controller.set_chart_type(TransactionType::Income);
        let chart = controller.snapshot().category_chart();
        assert_eq!(
            chart.ready().unwrap().labels,
            vec![Category::Salary, Category::Allowance]
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_before_return() {
        let (_, controller) = loaded(MemoryStore::default().with_ids(["s1"])).await;
        let mut rx = controller.subscribe();
        controller
            .create(&lunch("2024-05-03", 1200).into())
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().transactions().len(), 1);
    }
}
