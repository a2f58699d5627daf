/// Fetch-all helper for paged Cosmos queries
use std::collections::HashSet;
use std::future::Future;

use crate::codec::{Message, Value};

/// Continuation cursor of a standard Cosmos list response
/// (`pagination.next_key`); `None` when absent or empty
pub fn next_key(response: &Message) -> Option<Vec<u8>> {
    response
        .get_message("pagination")
        .and_then(|p| p.get_bytes("next_key"))
        .filter(|key| !key.is_empty())
        .map(<[u8]>::to_vec)
}

/// Fetch every page of a query that reports its cursor in `pagination.next_key`
pub async fn fetch_all<F, Fut, E>(fetch_page: F) -> Result<Message, E>
where
    F: FnMut(Option<Vec<u8>>) -> Fut,
    Fut: Future<Output = Result<Message, E>>,
{
    fetch_all_with(next_key, fetch_page).await
}

/// Call `fetch_page` with no cursor, then with each returned cursor until
/// `cursor_of` yields nothing. Pages are merged with `merge_page`.
///
/// A cursor seen twice ends the loop: some nodes echo the last key instead
/// of clearing it.
pub async fn fetch_all_with<C, F, Fut, E>(cursor_of: C, mut fetch_page: F) -> Result<Message, E>
where
    C: Fn(&Message) -> Option<Vec<u8>>,
    F: FnMut(Option<Vec<u8>>) -> Fut,
    Fut: Future<Output = Result<Message, E>>,
{
    let mut merged = fetch_page(None).await?;
    let mut cursor = cursor_of(&merged);
    let mut seen = HashSet::new();
    let mut pages = 1usize;

    while let Some(key) = cursor.take().filter(|k| !k.is_empty()) {
        if !seen.insert(key.clone()) {
            log::warn!("Cursor {} repeated after {} pages, stopping", hex::encode(&key), pages);
            break;
        }
        let page = fetch_page(Some(key)).await?;
        cursor = cursor_of(&page);
        merged = merge_page(merged, page);
        pages += 1;
    }

    log::debug!("Fetched {} pages", pages);
    Ok(merged)
}

/// Repeated fields concatenate in page order; every other field takes the
/// value from the later page.
pub fn merge_page(mut acc: Message, page: Message) -> Message {
    for (name, value) in page {
        match value {
            Value::List(more) => match acc.get_mut(&name) {
                Some(Value::List(items)) => items.extend(more),
                _ => acc.set(name, Value::List(more)),
            },
            value => acc.set(name, value),
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn page(items: &[&str], cursor: &[u8], total: u64) -> Message {
        Message::new()
            .with(
                "items",
                items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>(),
            )
            .with(
                "pagination",
                Message::new().with("next_key", cursor.to_vec()).with("total", total),
            )
    }

    #[tokio::test]
    async fn test_three_pages_concatenate() {
        let pages = vec![
            page(&["a", "b"], b"k1", 5),
            page(&["c"], b"k2", 5),
            page(&["d", "e"], b"", 5),
        ];
        let cursors = RefCell::new(Vec::new());

        let merged = fetch_all(|cursor| {
            cursors.borrow_mut().push(cursor.clone());
            let index = cursors.borrow().len() - 1;
            let result = pages[index].clone();
            async move { Ok::<_, String>(result) }
        })
        .await
        .unwrap();

        let items: Vec<_> = merged
            .get_list("items")
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(
            cursors.into_inner(),
            vec![None, Some(b"k1".to_vec()), Some(b"k2".to_vec())]
        );
        // Scalars come from the last page
        assert_eq!(next_key(&merged), None);
    }

    #[tokio::test]
    async fn test_repeated_cursor_stops() {
        let calls = RefCell::new(0);
        let merged = fetch_all(|_| {
            *calls.borrow_mut() += 1;
            async { Ok::<_, String>(page(&["x"], b"same", 0)) }
        })
        .await
        .unwrap();

        assert_eq!(*calls.borrow(), 2);
        assert_eq!(merged.get_list("items").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_error_aborts() {
        let calls = RefCell::new(0);
        let result = fetch_all(|cursor| {
            *calls.borrow_mut() += 1;
            async move {
                match cursor {
                    None => Ok(page(&["a"], b"next", 0)),
                    Some(_) => Err("node unavailable".to_string()),
                }
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "node unavailable");
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn test_custom_cursor() {
        let merged = fetch_all_with(
            |m: &Message| m.get_str("cursor").filter(|c| !c.is_empty()).map(|c| c.as_bytes().to_vec()),
            |cursor| async move {
                let msg = match cursor.as_deref() {
                    None => Message::new().with("rows", vec![Value::Uint64(1)]).with("cursor", "p2"),
                    Some(_) => Message::new().with("rows", vec![Value::Uint64(2)]).with("cursor", ""),
                };
                Ok::<_, String>(msg)
            },
        )
        .await
        .unwrap();
        assert_eq!(merged.get_list("rows").unwrap(), &[Value::Uint64(1), Value::Uint64(2)]);
    }
}
