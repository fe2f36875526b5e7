//! Dispatcher: упорядоченная отправка запросов через транспортный порт.

use std::collections::HashMap;

use log::{debug, warn};

use crate::dispatch::request::{Priority, SubmissionRequest, SubmissionStatus};
use crate::domain::{MatchId, Nonce};
use crate::ports::ledger::LedgerClient;

/// Настройки dispatcher'а.
#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// Сколько запросов выбирается за один drain-тик.
    pub drain_batch: usize,
    /// Ограничение одновременных отправок внутри тика.
    pub max_in_flight: usize,
    /// База экспоненциального backoff'а.
    pub backoff_base_ms: u64,
    /// Потолок попыток; дальше запрос помечается Failed навсегда.
    pub max_attempts: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            drain_batch: 16,
            max_in_flight: 4,
            backoff_base_ms: 250,
            max_attempts: 5,
        }
    }
}

/// Запись очереди: запрос + метаданные планирования.
#[derive(Clone, Debug)]
struct QueuedRequest {
    request: SubmissionRequest,
    priority: Priority,
    /// Монотонный порядковый номер постановки (FIFO внутри приоритета).
    seq: u64,
    attempts: u32,
    next_attempt_at_ms: u64,
}

/// Очередь отправки. Однопоточная по построению: все вызовы приходят
/// от владельца, конкурентность ограничивается max_in_flight внутри тика.
pub struct Dispatcher<T: LedgerClient> {
    transport: T,
    config: DispatcherConfig,
    queue: Vec<QueuedRequest>,
    /// Nonce → статус. Дубль nonce возвращает записанный исход,
    /// а не применяет запрос заново – это и делает ретраи безопасными.
    statuses: HashMap<Nonce, SubmissionStatus>,
    seq_counter: u64,
}

impl<T: LedgerClient> Dispatcher<T> {
    pub fn new(transport: T, config: DispatcherConfig) -> Self {
        Self {
            transport,
            config,
            queue: Vec::new(),
            statuses: HashMap::new(),
            seq_counter: 0,
        }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Поставить запрос в очередь.
    ///
    /// Дубль nonce – идемпотентный replay: возвращаем записанный статус,
    /// ничего не ставя в очередь. Critical отправляется сразу же.
    pub fn enqueue(
        &mut self,
        request: SubmissionRequest,
        priority: Priority,
        now_ms: u64,
    ) -> SubmissionStatus {
        if let Some(status) = self.statuses.get(&request.nonce) {
            debug!("nonce {}: duplicate enqueue, replay статуса", request.nonce);
            return status.clone();
        }

        let nonce = request.nonce;
        self.seq_counter += 1;
        let qr = QueuedRequest {
            request,
            priority,
            seq: self.seq_counter,
            attempts: 0,
            next_attempt_at_ms: now_ms,
        };

        self.statuses.insert(nonce, SubmissionStatus::Pending);
        self.queue.push(qr);

        if priority == Priority::Critical {
            // Немедленная отправка вне drain-цикла. Per-match порядок
            // всё равно соблюдаем: если впереди есть запрос того же
            // матча, critical подождёт своего drain'а.
            self.drain(now_ms);
        }

        self.statuses
            .get(&nonce)
            .cloned()
            .unwrap_or(SubmissionStatus::Pending)
    }

    /// Статус по nonce (status query).
    pub fn status(&self, nonce: Nonce) -> Option<&SubmissionStatus> {
        self.statuses.get(&nonce)
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Один drain-тик: выбрать до N готовых запросов в порядке
    /// (приоритет убыв., время постановки возр.) и отправить,
    /// не превышая max_in_flight.
    pub fn drain(&mut self, now_ms: u64) -> usize {
        let eligible = self.select_eligible(now_ms);
        let mut dispatched = 0;

        for seq in eligible {
            if dispatched >= self.config.max_in_flight {
                break;
            }
            self.dispatch_one(seq, now_ms);
            dispatched += 1;
        }

        // Терминальные записи больше не нужны в очереди.
        let statuses = &self.statuses;
        self.queue
            .retain(|qr| !statuses.get(&qr.request.nonce).is_some_and(|s| s.is_terminal()));

        dispatched
    }

    /// Выбрать seq'и запросов, готовых к отправке.
    ///
    /// Запрос не готов, пока в очереди есть более ранний запрос того же
    /// матча: tier не должен увидеть действия матча вне порядка.
    fn select_eligible(&self, now_ms: u64) -> Vec<u64> {
        let mut earliest_per_match: HashMap<MatchId, u64> = HashMap::new();
        for qr in &self.queue {
            earliest_per_match
                .entry(qr.request.match_id)
                .and_modify(|s| *s = (*s).min(qr.seq))
                .or_insert(qr.seq);
        }

        let mut ready: Vec<&QueuedRequest> = self
            .queue
            .iter()
            .filter(|qr| qr.next_attempt_at_ms <= now_ms)
            .filter(|qr| earliest_per_match.get(&qr.request.match_id) == Some(&qr.seq))
            .collect();

        ready.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        ready
            .into_iter()
            .take(self.config.drain_batch)
            .map(|qr| qr.seq)
            .collect()
    }

    fn dispatch_one(&mut self, seq: u64, now_ms: u64) {
        let Some(idx) = self.queue.iter().position(|qr| qr.seq == seq) else {
            return;
        };

        let (nonce, match_id) = {
            let qr = &self.queue[idx];
            (qr.request.nonce, qr.request.match_id)
        };

        let result = {
            let qr = &self.queue[idx];
            self.transport
                .submit(qr.request.match_id, &qr.request.action, &qr.request.signers)
        };

        let qr = &mut self.queue[idx];
        match result {
            Ok(receipt) => {
                debug!("nonce {nonce}: submit ok, match {match_id}");
                self.statuses
                    .insert(nonce, SubmissionStatus::Succeeded(receipt));
            }
            Err(e) => {
                qr.attempts += 1;
                if qr.attempts >= self.config.max_attempts {
                    warn!(
                        "nonce {nonce}: попытки исчерпаны ({}), постоянный отказ: {e}",
                        qr.attempts
                    );
                    self.statuses.insert(
                        nonce,
                        SubmissionStatus::Failed {
                            attempts: qr.attempts,
                            last_error: e.to_string(),
                        },
                    );
                } else {
                    // Экспоненциальный backoff: base * 2^(attempts-1).
                    let delay = self
                        .config
                        .backoff_base_ms
                        .saturating_mul(1u64 << (qr.attempts - 1).min(16));
                    qr.next_attempt_at_ms = now_ms.saturating_add(delay);
                    debug!(
                        "nonce {nonce}: попытка {} неудачна, ретрай через {delay}ms",
                        qr.attempts
                    );
                    self.statuses.insert(
                        nonce,
                        SubmissionStatus::Retrying {
                            attempts: qr.attempts,
                            next_attempt_at_ms: qr.next_attempt_at_ms,
                        },
                    );
                }
            }
        }
    }
}
