use mdm_authz::authz::{
    all_permissions, can_access_resource, filter_by_module_and_resource, has_all_permissions,
    has_any_permission, has_permission, is_valid_permission, permissions, permissions_for_module,
    Module, Role,
};
use mdm_authz::models::profile::{PlantActions, PlantPermission};
use mdm_authz::{PlantId, UserAuthProfile};
use proptest::prelude::*;
use serde_json::json;

fn catalog() -> Vec<&'static str> {
    all_permissions().collect()
}

fn permission_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(catalog()).prop_map(str::to_string),
        1 => "[a-z]{1,8}:[a-z_]{1,16}",
    ]
}

fn actions_strategy() -> impl Strategy<Value = PlantActions> {
    (
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(create, read, update, delete)| PlantActions {
            create,
            read,
            update,
            delete,
        })
}

fn profile_strategy() -> impl Strategy<Value = UserAuthProfile> {
    let module = prop::sample::select(Module::ALL.to_vec()).prop_map(|m| m.key().to_string());
    let grant = (module, 1..8i64, actions_strategy())
        .prop_map(|(module, plant, actions)| PlantPermission::new(module, plant, actions));

    (
        prop::collection::vec(2..6i64, 0..3),
        prop::collection::vec(prop::sample::select(catalog()), 0..10),
        prop::collection::vec(grant, 0..6),
        prop::collection::vec(1..8i64, 0..4),
        prop::collection::vec(1..8i64, 0..4),
        any::<bool>(),
    )
        .prop_map(|(roles, global, grants, permitted, it, it_bin)| {
            UserAuthProfile::new(42)
                .with_roles(roles)
                .with_permissions(global)
                .with_plant_permissions(grants)
                .with_permitted_plants(permitted)
                .with_it_plants(it)
                .with_it_bin(it_bin)
        })
}

fn scoped(module: &str, plant: PlantId, actions: PlantActions) -> PlantPermission {
    PlantPermission::new(module, plant, actions)
}

#[test]
fn no_grants_means_no_access_for_every_regular_role() {
    for role in [Role::Approver, Role::ItBin, Role::User] {
        let profile = UserAuthProfile::new(5).with_roles([role.id()]);
        assert!(!has_permission(Some(&profile), permissions::READ_PLANT, None), "{role:?}");
        assert!(!has_permission(Some(&profile), permissions::READ_PLANT, Some(5)), "{role:?}");
    }
}

#[test]
fn global_grant_holds_with_and_without_resource() {
    let profile = UserAuthProfile::new(5).with_roles([4]).with_permissions([permissions::READ_PLANT]);
    assert!(has_permission(Some(&profile), permissions::READ_PLANT, None));
    assert!(has_permission(Some(&profile), permissions::READ_PLANT, Some(5)));
}

#[test]
fn scoped_update_grant_at_plant_five() {
    let update = PlantActions {
        update: Some(true),
        ..PlantActions::default()
    };
    let profile = UserAuthProfile::new(5).with_plant_permissions(vec![scoped("plant", 5, update)]);

    assert!(has_permission(Some(&profile), permissions::UPDATE_PLANT, Some(5)));
    assert!(!has_permission(Some(&profile), permissions::DELETE_PLANT, Some(5)));
    // Plant 6 has no scoped entry, so the (absent) global grant decides.
    assert!(!has_permission(Some(&profile), permissions::UPDATE_PLANT, Some(6)));

    let with_global = profile.with_permissions([permissions::UPDATE_PLANT]);
    assert!(has_permission(Some(&with_global), permissions::UPDATE_PLANT, Some(6)));
}

#[test]
fn module_filter_example() {
    let records = vec![json!({"id": 1, "plant_location_id": 5}), json!({"id": 2})];

    let plant_five = UserAuthProfile::new(5)
        .with_plant_permissions(vec![scoped("plant", 5, PlantActions::default())]);
    let visible = filter_by_module_and_resource(records.clone(), Some(&plant_five), "plant");
    assert_eq!(visible, records);

    let plant_seven = UserAuthProfile::new(5)
        .with_plant_permissions(vec![scoped("plant", 7, PlantActions::default())]);
    let visible = filter_by_module_and_resource(records, Some(&plant_seven), "plant");
    assert_eq!(visible, vec![json!({"id": 2})]);
}

#[test]
fn catalog_round_trip() {
    for module in Module::ALL {
        for permission in permissions_for_module(module.key()).expect("known module") {
            assert!(is_valid_permission(permission));
        }
    }
}

proptest! {
    #[test]
    fn any_is_or_and_all_is_and(
        profile in profile_strategy(),
        perms in prop::collection::vec(permission_strategy(), 0..6),
        resource in prop::option::of(1..8i64),
    ) {
        let refs: Vec<&str> = perms.iter().map(String::as_str).collect();
        let singles: Vec<bool> = refs
            .iter()
            .map(|p| has_permission(Some(&profile), p, resource))
            .collect();

        prop_assert_eq!(
            has_any_permission(Some(&profile), &refs, resource),
            singles.iter().any(|allowed| *allowed)
        );
        prop_assert_eq!(
            has_all_permissions(Some(&profile), &refs, resource),
            singles.iter().all(|allowed| *allowed)
        );
    }

    #[test]
    fn decisions_are_pure(
        profile in profile_strategy(),
        permission in permission_strategy(),
        resource in prop::option::of(1..8i64),
    ) {
        let snapshot = profile.clone();
        let first = has_permission(Some(&profile), &permission, resource);
        let second = has_permission(Some(&profile), &permission, resource);
        prop_assert_eq!(first, second);
        prop_assert_eq!(&profile, &snapshot);
    }

    #[test]
    fn super_admin_allows_everything(
        profile in profile_strategy(),
        resource in prop::option::of(-5..50i64),
        gate in -5..50i64,
        via_flag in any::<bool>(),
    ) {
        let admin = if via_flag {
            profile.with_super_admin_flag(true)
        } else {
            let mut roles: Vec<i64> = profile.role_ids.iter().copied().collect();
            roles.push(Role::SuperAdmin.id());
            profile.with_roles(roles)
        };

        for permission in all_permissions() {
            prop_assert!(has_permission(Some(&admin), permission, resource));
        }
        prop_assert!(can_access_resource(Some(&admin), gate));

        let records = vec![json!({"plant_id": gate}), json!({"plantId": "x"}), json!({})];
        prop_assert_eq!(
            filter_by_module_and_resource(records.clone(), Some(&admin), "vendor"),
            records
        );
    }

    #[test]
    fn unknown_permissions_never_granted(
        profile in profile_strategy(),
        permission in "[a-z]{1,8}:[a-z]{1,6}_x",
        resource in prop::option::of(1..8i64),
    ) {
        let profile = profile.with_permissions([permission.clone()]);
        prop_assert!(!has_permission(Some(&profile), &permission, resource));
    }
}
