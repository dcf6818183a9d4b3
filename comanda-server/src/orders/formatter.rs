//! Group formatter - folds the lines of one group into the aggregate view
//!
//! Lines sharing a group id are one logical order. The fold takes scalars
//! (id, note, timestamps) from the last line and lists every line as an
//! item entry. All lines must agree on the shared fields; a divergent group
//! is corrupt and the fold fails instead of picking a winner.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::{OrderItemView, OrderLine, OrderView};

use super::money;

/// Fold the lines of one group into an [`OrderView`].
pub fn fold_lines(lines: &[OrderLine]) -> AppResult<OrderView> {
    let Some(last) = lines.last() else {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    };

    for line in lines {
        let consistent = line.group_id == last.group_id
            && line.shop_id == last.shop_id
            && line.customer_id == last.customer_id
            && line.table_id == last.table_id
            && line.status == last.status;
        if !consistent {
            tracing::error!(
                group_id = %last.group_id,
                line_id = line.id,
                "Order lines disagree on shared fields"
            );
            return Err(AppError::new(ErrorCode::OrderInconsistent)
                .with_detail("group_id", last.group_id.clone()));
        }
    }

    let items: Vec<OrderItemView> = lines
        .iter()
        .map(|line| OrderItemView {
            item_id: line.item_id,
            quantity: line.quantity,
            total: line.total,
        })
        .collect();

    Ok(OrderView {
        id: last.id,
        group_id: last.group_id.clone(),
        shop_id: last.shop_id,
        customer_id: last.customer_id,
        table_id: last.table_id,
        status: last.status,
        note: last.note.clone(),
        created_at: last.created_at,
        updated_at: last.updated_at,
        total: money::sum_totals(lines.iter().map(|l| l.total)),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    fn line(id: i64, item_id: i64, total: f64) -> OrderLine {
        OrderLine {
            id,
            group_id: "g-1".to_string(),
            shop_id: 1,
            customer_id: 2,
            item_id,
            quantity: 1,
            table_id: 1,
            status: OrderStatus::Open,
            total,
            note: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_fold_single_line() {
        let view = fold_lines(&[line(10, 3, 457.78)]).unwrap();

        assert_eq!(view.id, 10);
        assert_eq!(view.group_id, "g-1");
        assert_eq!(view.status, OrderStatus::Open);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].item_id, 3);
        assert_eq!(view.items[0].total, 457.78);
        assert_eq!(view.total, 457.78);
    }

    #[test]
    fn test_fold_sums_totals_precisely() {
        let view = fold_lines(&[line(1, 3, 0.1), line(2, 4, 0.2)]).unwrap();
        assert_eq!(view.total, 0.3);
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_fold_takes_scalars_from_last_line() {
        let mut a = line(1, 3, 5.0);
        a.note = Some("first".to_string());
        let mut b = line(2, 4, 7.0);
        b.note = Some("second".to_string());
        b.updated_at = 1_700_000_001_000;

        let view = fold_lines(&[a, b]).unwrap();
        assert_eq!(view.id, 2);
        assert_eq!(view.note.as_deref(), Some("second"));
        assert_eq!(view.updated_at, 1_700_000_001_000);
        assert_eq!(view.total, 12.0);
    }

    #[test]
    fn test_fold_empty_fails() {
        let err = fold_lines(&[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn test_fold_rejects_divergent_shop() {
        let a = line(1, 3, 5.0);
        let mut b = line(2, 4, 7.0);
        b.shop_id = 9;

        let err = fold_lines(&[a, b]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInconsistent);
    }

    #[test]
    fn test_fold_rejects_divergent_status() {
        let a = line(1, 3, 5.0);
        let mut b = line(2, 4, 7.0);
        b.status = OrderStatus::Closed;

        let err = fold_lines(&[a, b]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInconsistent);
    }

    #[test]
    fn test_fold_rejects_divergent_group_id() {
        let a = line(1, 3, 5.0);
        let mut b = line(2, 4, 7.0);
        b.group_id = "g-2".to_string();

        let err = fold_lines(&[a, b]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInconsistent);
    }
}
