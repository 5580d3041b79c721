use deferred_list::DeferredList;
use test_log::test;

#[test]
fn inserts_into_an_empty_list() -> deferred_list::Result<()> {
    let mut list = DeferredList::new();

    list.insert(0, 'a')?;
    list.insert(1, 'b')?;
    list.insert(0, 'c')?;

    // pending reads already observe the final order
    assert_eq!(3, list.len());
    assert_eq!(&'c', list.get(0)?);
    assert_eq!(&'a', list.get(1)?);
    assert_eq!(&'b', list.get(2)?);

    list.commit()?;
    assert_eq!(&['c', 'a', 'b'], list.as_slice()?);

    Ok(())
}

#[test]
fn adjacent_removes_collapse() -> deferred_list::Result<()> {
    let mut list = DeferredList::from(vec![10, 20, 30, 40, 50]);

    list.remove(1)?;
    list.remove(1)?;

    // both removals fused into a single pending edit site
    assert_eq!(1, list.pending_edits());
    assert_eq!(3, list.len());
    assert_eq!(&40, list.get(1)?);

    list.commit()?;
    assert_eq!(&[10, 40, 50], list.as_slice()?);

    Ok(())
}

#[test]
fn insert_then_remove_cancels_out() -> deferred_list::Result<()> {
    let mut list = DeferredList::from(vec![10, 20, 30]);

    list.insert(1, 99)?;
    list.remove(1)?;

    assert_eq!(0, list.pending_edits());
    assert_eq!(&[10, 20, 30], list.as_slice()?);

    Ok(())
}

#[test]
fn sets_then_remove_collapse_to_a_remove() -> deferred_list::Result<()> {
    let mut list = DeferredList::from(vec![10, 20, 30]);

    list.set(1, 7)?;
    list.set(1, 8)?;
    list.remove(1)?;

    assert_eq!(1, list.pending_edits());

    list.commit()?;
    assert_eq!(&[10, 30], list.as_slice()?);

    Ok(())
}

#[test]
fn remove_then_insert_becomes_an_overwrite() -> deferred_list::Result<()> {
    let mut list = DeferredList::from(vec![10, 20, 30]);

    list.remove(1)?;
    list.insert(1, 77)?;

    assert_eq!(1, list.pending_edits());
    assert_eq!(3, list.len());
    assert_eq!(&77, list.get(1)?);

    list.commit()?;
    assert_eq!(&[10, 77, 30], list.as_slice()?);

    Ok(())
}

#[test]
fn thousand_interleaved_inserts_settle_in_place() -> deferred_list::Result<()> {
    let mut seed: Vec<usize> = (0..1000).collect();
    seed.reserve(1000);
    let capacity = seed.capacity();

    let mut reference = seed.clone();
    let mut list = DeferredList::from(seed).with_auto_commit_height(usize::MAX);

    for i in 0..1000 {
        reference.insert(i, i);
        list.insert(i, i)?;
    }

    assert_eq!(1000, list.pending_edits());
    list.commit()?;

    let settled = list.into_vec()?;
    assert_eq!(2000, settled.len());
    assert_eq!(reference, settled);

    // the commit pass appends in place, never reallocating
    assert_eq!(capacity, settled.capacity());

    Ok(())
}
