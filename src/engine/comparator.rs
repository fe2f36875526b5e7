//! Подключаемый компаратор силы рук.
//!
//! Конкретный алгоритм ранжирования – продуктовое решение и сюда не входит.
//! Движку важен только контракт: тотальный порядок, детерминизм,
//! ничьи разрешаются фиксированным порядком id.

use crate::domain::card::Card;
use crate::domain::participant::Participant;
use crate::domain::ParticipantId;

/// Компаратор, выбирающий победителя среди вскрывшихся участников.
pub trait HandComparator {
    /// Вернуть id победителя. `contenders` непуст (движок это гарантирует),
    /// общие карты могут быть пустыми.
    fn compare(&self, contenders: &[&Participant], shared: &[Card]) -> ParticipantId;
}

/// Компаратор по умолчанию: лексикографическое сравнение отсортированных
/// по убыванию значений карт (hole ∪ shared). Ничья → меньший id.
///
/// Это НЕ покерное ранжирование, а детерминированная заглушка с
/// правильным контрактом; продуктовый компаратор подставляется вместо неё.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighCardComparator;

impl HighCardComparator {
    fn strength(p: &Participant, shared: &[Card]) -> Vec<u8> {
        let mut values: Vec<u8> = p
            .hole_cards
            .iter()
            .chain(shared.iter())
            .map(|c| c.rank.value())
            .collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values
    }
}

impl HandComparator for HighCardComparator {
    fn compare(&self, contenders: &[&Participant], shared: &[Card]) -> ParticipantId {
        let mut best: Option<(Vec<u8>, ParticipantId)> = None;
        for p in contenders {
            let s = Self::strength(p, shared);
            match &best {
                None => best = Some((s, p.id)),
                Some((bs, bid)) => {
                    // Ничья по силе → фиксированный порядок: меньший id.
                    if s > *bs || (s == *bs && p.id < *bid) {
                        best = Some((s, p.id));
                    }
                }
            }
        }
        best.map(|(_, id)| id).unwrap_or_default()
    }
}
